mod cli;
mod commands;
mod render;

use estate_lots::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
