pub mod photos;
pub mod print_jobs;
