mod common;
mod eligibility;
mod wizard;
