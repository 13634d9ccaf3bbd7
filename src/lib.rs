pub mod app;
pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod mailer;
pub mod meals;
pub mod quizzes;
pub mod state;
pub mod users;
