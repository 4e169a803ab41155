pub mod classify;
pub mod compare;
pub mod dp;
pub mod emit;
pub mod report;
pub mod score;
pub mod tempo;
pub mod validation;
