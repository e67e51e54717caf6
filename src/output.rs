use std::io::{self, Write};

use serde::Serialize;

use crate::detail::DetailView;
use crate::domain::{Seed, SortMode, Theme};
use crate::publish::PublishResult;
use crate::seo::HtmlHead;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResult<'a> {
    pub sort: SortMode,
    pub query: &'a str,
    pub count: usize,
    pub seeds: Vec<&'a Seed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowResult<'a> {
    pub seed: &'a Seed,
    pub created: String,
    pub head: &'a HtmlHead,
}

impl<'a> ShowResult<'a> {
    pub fn new(detail: &'a DetailView, head: &'a HtmlHead) -> Self {
        Self {
            seed: detail.seed(),
            created: detail.format_created_at(),
            head,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemeResult {
    pub theme: Theme,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_list(result: &ListResult<'_>) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_show(result: &ShowResult<'_>) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_theme(result: &ThemeResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_publish(result: &PublishResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
