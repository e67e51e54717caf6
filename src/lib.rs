pub mod catalog;
pub mod config;
pub mod controller;
pub mod detail;
pub mod domain;
pub mod error;
pub mod list;
pub mod output;
pub mod publish;
pub mod seo;
pub mod theme;
pub mod tui;
