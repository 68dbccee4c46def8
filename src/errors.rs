use thiserror::Error;

#[derive(Error, Debug)]
pub enum WingmanError {
    #[error("invalid input: {0}")] InvalidInput(String),
    #[error("storage error: {0}")] Storage(String),
}
