pub mod seaorm;

pub use seaorm::{with_ownership_filter, SeaOrmRepository};
