//! Text utilities shared across modules

pub mod html;
pub mod string;
