//! Shared mocks for command tests.

use crate::amazon::{FetchedPage, PageFetcher};
use crate::prompt::Prompter;
use anyhow::Result;
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock fetcher serving canned pages and images by URL.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, FetchedPage>,
    images: HashMap<String, Vec<u8>>,
    page_requests: AtomicUsize,
    image_requests: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves a 200 text/html page at `url`.
    pub fn with_html(self, url: &str, body: &str) -> Self {
        self.with_page(url, 200, url, Some("text/html; charset=utf-8"), body)
    }

    pub fn with_page(
        mut self,
        url: &str,
        status: u16,
        final_url: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchedPage {
                status,
                final_url: final_url.to_string(),
                content_type: content_type.map(String::from),
                body: body.to_string(),
            },
        );
        self
    }

    pub fn with_image(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.images.insert(url.to_string(), bytes);
        self
    }

    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::SeqCst)
    }

    pub fn image_requests(&self) -> usize {
        self.image_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        match self.pages.get(url) {
            Some(page) => Ok(page.clone()),
            None => anyhow::bail!("Simulated network error for {}", url),
        }
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        self.image_requests.fetch_add(1, Ordering::SeqCst);
        match self.images.get(url) {
            Some(bytes) => Ok(bytes.clone()),
            None => anyhow::bail!("Request to {} failed with status 404", url),
        }
    }
}

/// Prompter replaying canned answers. Records every multi-select offer.
#[derive(Default)]
pub struct ScriptedPrompter {
    inputs: VecDeque<String>,
    selections: VecDeque<Vec<String>>,
    pub input_messages: Vec<String>,
    pub offered_choices: Vec<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a text answer; an empty string means "accept the default".
    pub fn answer(mut self, text: &str) -> Self {
        self.inputs.push_back(text.to_string());
        self
    }

    pub fn select(mut self, picks: &[&str]) -> Self {
        self.selections.push_back(picks.iter().map(|s| s.to_string()).collect());
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        self.input_messages.push(message.to_string());
        let answer = self
            .inputs
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("Unexpected prompt: {}", message))?;

        if answer.is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(answer)
    }

    fn multi_select(&mut self, message: &str, choices: &[String]) -> Result<Vec<String>> {
        self.offered_choices.push(choices.to_vec());
        self.selections
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("Unexpected selection prompt: {}", message))
    }
}

/// Encodes a solid-color PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([10, 120, 200])));
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).expect("encode test png");
    buf.into_inner()
}
