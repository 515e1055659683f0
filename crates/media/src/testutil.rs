//! Shared test doubles for the pipeline tests.

use std::{
    collections::HashMap,
    sync::Mutex,
};

use {async_trait::async_trait, charla_whatsapp::ChannelClient};

use crate::{Error, ObjectStore, Result, VisionClient};

/// Channel that records sends and serves media downloads from a fixture map.
#[derive(Default)]
pub struct RecordingChannel {
    pub sent:  Mutex<Vec<(String, String, String)>>,
    pub media: Mutex<HashMap<String, Vec<u8>>>,
}

impl RecordingChannel {
    pub fn with_media(media_id: &str, bytes: &[u8]) -> Self {
        let channel = Self::default();
        channel
            .media
            .lock()
            .unwrap()
            .insert(media_id.into(), bytes.to_vec());
        channel
    }

    pub fn sent_bodies(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, body, _)| body.clone()).collect()
    }
}

#[async_trait]
impl ChannelClient for RecordingChannel {
    async fn send_text(
        &self,
        to: &str,
        body: &str,
        business_id: &str,
    ) -> charla_whatsapp::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.into(), body.into(), business_id.into()));
        Ok(())
    }

    async fn download_media(&self, media_id: &str) -> charla_whatsapp::Result<Vec<u8>> {
        self.media
            .lock()
            .unwrap()
            .get(media_id)
            .cloned()
            .ok_or_else(|| charla_whatsapp::Error::platform(format!("no media {media_id}")))
    }
}

/// In-memory object store.
#[derive(Default)]
pub struct MemoryObjects {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub puts:    Mutex<usize>,
}

#[async_trait]
impl ObjectStore for MemoryObjects {
    async fn put(&self, path: &str, bytes: &[u8], _content_type: &str) -> Result<()> {
        *self.puts.lock().unwrap() += 1;
        self.objects.lock().unwrap().insert(path.into(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::storage(format!("no object {path}")))
    }
}

/// Object store whose puts always fail.
pub struct FailingObjects;

#[async_trait]
impl ObjectStore for FailingObjects {
    async fn put(&self, _path: &str, _bytes: &[u8], _content_type: &str) -> Result<()> {
        Err(Error::storage("put unavailable"))
    }

    async fn get(&self, _path: &str) -> Result<Vec<u8>> {
        Err(Error::storage("get unavailable"))
    }
}

/// Vision backend returning a fixed text and counting invocations.
pub struct StubVision {
    pub text:  String,
    pub calls: Mutex<usize>,
}

impl StubVision {
    pub fn new(text: &str) -> Self {
        Self {
            text:  text.into(),
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl VisionClient for StubVision {
    async fn extract_text(&self, _bytes: &[u8]) -> Result<String> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.text.clone())
    }
}
