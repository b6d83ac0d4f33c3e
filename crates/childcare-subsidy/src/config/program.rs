use serde::{Deserialize, Serialize};

/// Household sizes covered by the explicit poverty guideline table.
pub const FPL_TABLE_SIZES: usize = 8;

/// Static program rules consumed by validation and eligibility derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Annual federal poverty guideline for household sizes 1 through 8.
    pub fpl_annual_thresholds: [u32; FPL_TABLE_SIZES],
    pub fpl_additional_person: u32,
    pub fpl_ceiling_percentage: u32,
    pub min_work_hours: u8,
    pub child_max_age: u32,
    pub child_max_age_special_needs: u32,
    pub max_children: usize,
    pub max_household_size: u8,
    pub max_dependents: u8,
    pub max_monthly_income: f64,
    pub max_hours_per_week: u8,
    pub max_special_needs_description: usize,
    pub max_upload_bytes: u64,
    pub accepted_upload_types: Vec<String>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            fpl_annual_thresholds: [15060, 20440, 25820, 31200, 36580, 41960, 47340, 52720],
            fpl_additional_person: 5380,
            fpl_ceiling_percentage: 200,
            min_work_hours: 20,
            child_max_age: 13,
            child_max_age_special_needs: 18,
            max_children: 4,
            max_household_size: 20,
            max_dependents: 19,
            max_monthly_income: 50_000.0,
            max_hours_per_week: 80,
            max_special_needs_description: 500,
            max_upload_bytes: 10 * 1024 * 1024,
            accepted_upload_types: ["application/pdf", "image/jpeg", "image/jpg", "image/png"]
                .iter()
                .map(|value| value.to_string())
                .collect(),
        }
    }
}
