//! `data:` URLs and in-memory blobs.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum DataUrlError {
    #[error("not a data URL (missing `data:` scheme)")]
    MissingScheme,
    #[error("malformed data URL (missing `,` separator)")]
    MissingComma,
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("invalid percent escape in data URL payload")]
    InvalidPercentEscape,
}

/// Bytes tagged with a MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Blob {
    pub fn new(mime: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A parsed `data:<mime>[;params][;base64],<payload>` URL.
///
/// [`fmt::Display`] always renders the base64 form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    mime: String,
    data: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            mime: mime.into(),
            data: data.into(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, DataUrlError> {
        let rest = text
            .trim()
            .strip_prefix("data:")
            .ok_or(DataUrlError::MissingScheme)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingComma)?;

        let mut params = header.split(';');
        let mime = match params.next() {
            Some(m) if !m.trim().is_empty() => m.trim().to_ascii_lowercase(),
            // RFC 2397 default.
            _ => "text/plain".to_string(),
        };
        let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

        let data = if is_base64 {
            STANDARD.decode(payload.trim())?
        } else {
            percent_decode(payload)?
        };
        Ok(Self { mime, data })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_blob(self) -> Blob {
        Blob {
            mime: self.mime,
            bytes: self.data,
        }
    }
}

impl FromStr for DataUrl {
    type Err = DataUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }
}

/// Decodes a data URL into the blob it names, like fetching it.
pub fn fetch_data_url(url: &str) -> Result<Blob, DataUrlError> {
    DataUrl::parse(url).map(DataUrl::into_blob)
}

fn percent_decode(s: &str) -> Result<Vec<u8>, DataUrlError> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or(DataUrlError::InvalidPercentEscape)?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}
