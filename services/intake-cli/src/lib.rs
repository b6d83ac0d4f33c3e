mod cli;
mod demo;
mod infra;
mod inspect;

use childcare_subsidy::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
