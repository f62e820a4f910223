use crate::error::Result;
#[cfg(feature = "compression")]
use crate::error::PdfError;
use crate::objects::{Dictionary, Object, Operator};

/// Payload of a stream object.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamContent {
    /// Bytes written as-is; any filter is already applied
    Raw(Vec<u8>),
    /// Content stream operators, rendered (and optionally deflated) at write time
    Operators {
        operators: Vec<Operator>,
        encode: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    dictionary: Dictionary,
    content: StreamContent,
}

impl Stream {
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_dictionary(Dictionary::new(), data)
    }

    pub fn with_dictionary(dictionary: Dictionary, data: Vec<u8>) -> Self {
        let mut dict = dictionary;
        dict.set("Length", data.len() as i64);

        Self {
            dictionary: dict,
            content: StreamContent::Raw(data),
        }
    }

    /// Content stream whose bytes and `Length` are produced when written.
    pub fn from_operators(dictionary: Dictionary, operators: Vec<Operator>) -> Self {
        Self {
            dictionary,
            content: StreamContent::Operators {
                operators,
                encode: true,
            },
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        &mut self.dictionary
    }

    pub fn content(&self) -> &StreamContent {
        &self.content
    }

    pub fn data(&self) -> Option<&[u8]> {
        match &self.content {
            StreamContent::Raw(data) => Some(data),
            StreamContent::Operators { .. } => None,
        }
    }

    pub fn operators(&self) -> Option<&[Operator]> {
        match &self.content {
            StreamContent::Operators { operators, .. } => Some(operators),
            StreamContent::Raw(_) => None,
        }
    }

    /// Append an operator; returns `false` for raw streams.
    pub fn push_operator(&mut self, operator: Operator) -> bool {
        match &mut self.content {
            StreamContent::Operators { operators, .. } => {
                operators.push(operator);
                true
            }
            StreamContent::Raw(_) => false,
        }
    }

    /// Whether an operator stream gets deflated at write time.
    pub fn set_encode(&mut self, value: bool) {
        if let StreamContent::Operators { encode, .. } = &mut self.content {
            *encode = value;
        }
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.dictionary.set("Filter", Object::name(filter));
    }

    #[cfg(feature = "compression")]
    pub fn compress_flate(&mut self) -> Result<()> {
        let (_, data) = self.encode(false)?;
        let compressed = deflate(&data)?;

        self.dictionary.set("Length", compressed.len() as i64);
        self.content = StreamContent::Raw(compressed);
        self.set_filter("FlateDecode");

        Ok(())
    }

    /// Final dictionary and bytes for this stream, `Length` included.
    ///
    /// Operator streams are rendered here and deflated when both the stream
    /// and the caller ask for it.
    pub fn encode(&self, compress: bool) -> Result<(Dictionary, Vec<u8>)> {
        let mut dict = self.dictionary.clone();
        let data = match &self.content {
            StreamContent::Raw(data) => data.clone(),
            StreamContent::Operators { operators, encode } => {
                let rendered = render_operators(operators)?;
                if *encode && compress {
                    encode_flate(&mut dict, rendered)?
                } else {
                    rendered
                }
            }
        };
        dict.set("Length", data.len() as i64);
        Ok((dict, data))
    }
}

fn render_operators(operators: &[Operator]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for op in operators {
        for operand in op.operands() {
            crate::writer::write_object_value(&mut out, operand)?;
            out.push(b' ');
        }
        out.extend_from_slice(op.name().as_bytes());
        out.push(b'\n');
    }
    Ok(out)
}

#[cfg(feature = "compression")]
fn encode_flate(dict: &mut Dictionary, data: Vec<u8>) -> Result<Vec<u8>> {
    let compressed = deflate(&data)?;
    dict.set("Filter", Object::name("FlateDecode"));
    Ok(compressed)
}

#[cfg(not(feature = "compression"))]
fn encode_flate(_dict: &mut Dictionary, data: Vec<u8>) -> Result<Vec<u8>> {
    Ok(data)
}

#[cfg(feature = "compression")]
pub(crate) fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| PdfError::CompressionError(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| PdfError::CompressionError(e.to_string()))
}
