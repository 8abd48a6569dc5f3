pub mod health;
pub mod invalidate;
pub mod webhook;
