pub mod category;
pub mod lock;
pub mod notification;
pub mod post;
pub mod report;
pub mod solution;
pub mod timer;
pub mod topic;
pub mod user;
pub mod user_action;
pub mod webhook;
