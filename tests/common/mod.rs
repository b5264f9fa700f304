// Shared fakes and fixtures for integration tests
// Author: kelexine (https://github.com/kelexine)

#![allow(dead_code)]

use async_trait::async_trait;
use image::{ImageBuffer, Rgb};
use label_helper::error::{LabelError, Result};
use label_helper::gemini::LabelInterpreter;
use label_helper::speech::{AudioClip, SpeechSynthesizer};
use label_helper::vision::NormalizedImage;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const SAMPLE_ANSWER: &str = "# 標籤解讀\n類型：食品\n主要成分：糖、檸檬酸\n\n總結說明：這是一般飲料。\n糖分偏高，請適量飲用。\n\n資料來源：食藥署";

/// A small RGB PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
    buffer.into_inner()
}

pub enum Reply {
    Text(String),
    Status(u16, String),
    Malformed(String),
}

pub struct FakeInterpreter {
    reply: Reply,
    pub calls: AtomicUsize,
    pub last_mime: Mutex<Option<String>>,
    pub last_prompt: Mutex<Option<String>>,
}

impl FakeInterpreter {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_mime: Mutex::new(None),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn answering(text: &str) -> Self {
        Self::new(Reply::Text(text.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LabelInterpreter for FakeInterpreter {
    async fn interpret(&self, image: &NormalizedImage, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_mime.lock().unwrap() = Some(image.mime_type.clone());
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Status(status, body) => Err(LabelError::InterpreterRequestFailed {
                status: *status,
                body: body.clone(),
            }),
            Reply::Malformed(msg) => Err(LabelError::MalformedResponse(msg.clone())),
        }
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

pub struct FakeSynthesizer {
    fail: bool,
    pub calls: AtomicUsize,
    pub last_text: Mutex<Option<String>>,
}

impl FakeSynthesizer {
    pub fn working() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
            last_text: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::working()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_text(&self) -> Option<String> {
        self.last_text.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<AudioClip> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_text.lock().unwrap() = Some(text.to_string());
        if self.fail {
            return Err(LabelError::SynthesisFailed("tts service unavailable".to_string()));
        }
        Ok(AudioClip {
            bytes: bytes::Bytes::from_static(b"ID3fake"),
            locale: "zh-TW".to_string(),
        })
    }

    fn locale(&self) -> &str {
        "zh-TW"
    }
}
