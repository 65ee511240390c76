//! Streaming extraction of `<Banner>` records from a feed document.

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::Event;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::FeedError;
use crate::record::RawBannerRecord;

/// The repeating container element holding one image record.
const CONTAINER: &[u8] = b"Banner";

/// Pull-based extractor yielding one [`RawBannerRecord`] per `<Banner>`
/// element, in document order.
///
/// Walks the input in a single forward pass without buffering the whole
/// document. Any element other than the container is skipped whole, subtree
/// included, so unknown feed extensions never break extraction.
pub struct BannerExtractor<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    cancel: CancellationToken,
    in_root: bool,
    done: bool,
}

/// Child elements recognized inside a `<Banner>`. Matching is
/// case-sensitive; anything else is skipped.
#[derive(Clone, Copy)]
enum BannerField {
    Rating,
    RatingCount,
    Language,
    ThumbnailPath,
    BannerType,
    BannerType2,
    BannerPath,
    Season,
}

impl BannerField {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"Rating" => Some(Self::Rating),
            b"RatingCount" => Some(Self::RatingCount),
            b"Language" => Some(Self::Language),
            b"ThumbnailPath" => Some(Self::ThumbnailPath),
            b"BannerType" => Some(Self::BannerType),
            b"BannerType2" => Some(Self::BannerType2),
            b"BannerPath" => Some(Self::BannerPath),
            b"Season" => Some(Self::Season),
            _ => None,
        }
    }
}

impl<R: BufRead> BannerExtractor<R> {
    pub fn new(input: R) -> Self {
        Self::with_cancellation(input, CancellationToken::new())
    }

    /// The token is checked at every container-element boundary; once
    /// cancelled the iterator yields [`FeedError::Cancelled`] and fuses.
    pub fn with_cancellation(input: R, cancel: CancellationToken) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            cancel,
            in_root: false,
            done: false,
        }
    }

    /// Advance to the next container element and parse it. `Ok(None)` means
    /// the document ended normally.
    fn next_record(&mut self) -> Result<Option<RawBannerRecord>, FeedError> {
        let mut skip_buf = Vec::new();
        loop {
            if self.cancel.is_cancelled() {
                return Err(FeedError::Cancelled);
            }
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => {
                    if e.name().as_ref() == CONTAINER {
                        return Ok(Some(self.read_record()?));
                    }
                    if !self.in_root {
                        // The first start tag is the feed's root element;
                        // records are its children, so descend into it.
                        self.in_root = true;
                        continue;
                    }
                    trace!(
                        element = %String::from_utf8_lossy(e.name().as_ref()),
                        "skipping unrecognized element"
                    );
                    self.reader.read_to_end_into(e.name(), &mut skip_buf)?;
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Parse the children of one container element. The record is emitted
    /// even when expected fields are missing; the ranker filters those out.
    fn read_record(&mut self) -> Result<RawBannerRecord, FeedError> {
        let mut record = RawBannerRecord::default();
        let mut skip_buf = Vec::new();
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => match BannerField::from_name(e.name().as_ref()) {
                    Some(field) => {
                        let text = self.read_element_text()?;
                        apply_field(&mut record, field, text)?;
                    }
                    None => {
                        self.reader.read_to_end_into(e.name(), &mut skip_buf)?;
                    }
                },
                Event::Empty(e) => {
                    if let Some(field) = BannerField::from_name(e.name().as_ref()) {
                        apply_field(&mut record, field, String::new())?;
                    }
                }
                Event::End(_) => return Ok(record),
                Event::Eof => return Err(FeedError::UnexpectedEof),
                _ => {}
            }
        }
    }

    /// Collect the text content of the element whose start tag was just
    /// consumed, up to its matching end tag. Stray markup inside the element
    /// contributes nothing to the text.
    fn read_element_text(&mut self) -> Result<String, FeedError> {
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Text(t) => text.push_str(&t.unescape()?),
                Event::CData(t) => match std::str::from_utf8(&t) {
                    Ok(s) => text.push_str(s),
                    Err(_) => return Err(FeedError::InvalidEncoding),
                },
                Event::Start(_) => depth += 1,
                Event::End(_) if depth == 0 => return Ok(text),
                Event::End(_) => depth -= 1,
                Event::Eof => return Err(FeedError::UnexpectedEof),
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for BannerExtractor<R> {
    type Item = Result<RawBannerRecord, FeedError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Store one parsed child element on the record.
///
/// Rating, vote count and resolution silently fall back to absent when they
/// fail to parse; season numbers are held to a stricter standard because the
/// season filter depends on them.
fn apply_field(
    record: &mut RawBannerRecord,
    field: BannerField,
    text: String,
) -> Result<(), FeedError> {
    match field {
        BannerField::Rating => record.rating = text.parse().ok(),
        BannerField::RatingCount => record.vote_count = text.parse().ok(),
        BannerField::Language => record.language = Some(text),
        BannerField::ThumbnailPath => record.thumbnail_path = Some(text),
        BannerField::BannerType => record.banner_type = Some(text),
        BannerField::BannerType2 => {
            let (width, height) = parse_resolution(&text);
            record.width = width;
            record.height = height;
            record.banner_type2 = Some(text);
        }
        BannerField::BannerPath => record.path = Some(text),
        BannerField::Season => {
            let val = text.trim();
            if !val.is_empty() {
                record.season = Some(
                    val.parse()
                        .map_err(|_| FeedError::MalformedSeason(val.to_string()))?,
                );
            }
        }
    }
    Ok(())
}

/// `BannerType2` sometimes carries the image resolution as
/// `"<width>x<height>"` instead of a role hint. Both halves must parse as
/// integers or neither dimension is taken.
fn parse_resolution(raw: &str) -> (Option<u32>, Option<u32>) {
    if let Some((w, h)) = raw.split_once('x') {
        if let (Ok(w), Ok(h)) = (w.parse(), h.parse()) {
            return (Some(w), Some(h));
        }
    }
    (None, None)
}
