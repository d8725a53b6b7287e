pub mod category;
pub mod post;
pub mod solution;
pub mod topic;
pub mod user;
