//! Amazon-specific modules for HTTP fetching, page parsing, and stock detection.

pub mod availability;
pub mod client;
pub mod links;
pub mod parser;
pub mod selectors;

pub use availability::{classify, Availability};
pub use client::{AmazonClient, FetchedPage, PageFetcher};
pub use links::{is_amazon_host, is_amazon_link};
pub use parser::{Listing, Parser};
