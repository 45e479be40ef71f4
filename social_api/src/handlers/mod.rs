pub mod flyers;
pub mod generate;
pub mod pages;
pub mod posts;
pub mod publish;
