//! PDF serialization
//!
//! [`PdfWriter`] walks an [`ObjectGraph`] in ascending reference order and
//! writes a classic cross-reference file. When a [`SecurityHandler`] is
//! supplied, every string and stream payload of every indirect object
//! (except the `/Encrypt` dictionary itself) goes through the handler's
//! per-object closure.

use crate::encryption::{SecurityConfig, SecurityHandler};
use crate::error::{PdfError, Result};
use crate::graph::{ObjectGraph, MAX_OBJECT_NUMBER};
use crate::objects::{Dictionary, Object, ObjectId, Stream};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Marks the file as binary for transfer tools.
const BINARY_COMMENT: &[u8] = &[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterConfig {
    /// Deflate operator content streams
    pub compress_content_streams: bool,
    /// Write the binary marker comment after the header
    pub binary_comment: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compress_content_streams: true,
            binary_comment: true,
        }
    }
}

type Encryptor<'a> = Option<&'a mut dyn FnMut(&[u8]) -> Vec<u8>>;

pub struct PdfWriter<W: Write> {
    writer: W,
    config: WriterConfig,
    xref_positions: HashMap<ObjectId, u64>,
    current_position: u64,
}

impl<W: Write> PdfWriter<W> {
    pub fn new_with_writer(writer: W) -> Self {
        Self::with_config(writer, WriterConfig::default())
    }

    pub fn with_config(writer: W, config: WriterConfig) -> Self {
        Self {
            writer,
            config,
            xref_positions: HashMap::new(),
            current_position: 0,
        }
    }

    /// Write `graph` unencrypted.
    pub fn write_graph(&mut self, graph: &ObjectGraph) -> Result<()> {
        self.write_document::<OsRng>(graph, None)
    }

    /// Write `graph` with every object encrypted by `handler`.
    ///
    /// [`SecurityHandler::encrypt`] must already have run on `graph`.
    pub fn write_encrypted_graph<R: RngCore + CryptoRng>(
        &mut self,
        graph: &ObjectGraph,
        handler: &mut SecurityHandler<R>,
    ) -> Result<()> {
        self.write_document(graph, Some(handler))
    }

    fn write_document<R: RngCore + CryptoRng>(
        &mut self,
        graph: &ObjectGraph,
        mut handler: Option<&mut SecurityHandler<R>>,
    ) -> Result<()> {
        let objects = graph.enumerate_indirect_objects();
        if let Some((id, _)) = objects.last().filter(|(id, _)| id.number() > MAX_OBJECT_NUMBER) {
            return Err(PdfError::InvalidReference(*id));
        }

        self.write_header(graph)?;

        let encrypt_id = graph.trailer().encrypt;
        tracing::debug!("Writing {} indirect objects", objects.len());

        for (id, object) in objects {
            match handler.as_deref_mut() {
                Some(handler) if encrypt_id != Some(id) => {
                    let mut encrypt = handler.encrypt_fn(id.number(), id.generation());
                    self.write_object(id, object, Some(&mut encrypt))?;
                }
                _ => self.write_object(id, object, None)?,
            }
        }

        let xref_position = self.current_position;
        self.write_xref()?;
        self.write_trailer(graph, xref_position)?;

        self.writer.flush()?;
        Ok(())
    }

    fn write_header(&mut self, graph: &ObjectGraph) -> Result<()> {
        let header = format!("%PDF-{}\n", graph.version().header_version());
        self.write_bytes(header.as_bytes())?;
        if self.config.binary_comment {
            self.write_bytes(BINARY_COMMENT)?;
        }
        Ok(())
    }

    fn write_object(
        &mut self,
        id: ObjectId,
        object: &Object,
        mut encrypt: Encryptor<'_>,
    ) -> Result<()> {
        let prepared = prepare_object(object, self.config.compress_content_streams, &mut encrypt)?;

        self.xref_positions.insert(id, self.current_position);

        let mut buffer = format!("{} {} obj\n", id.number(), id.generation()).into_bytes();
        write_object_value(&mut buffer, &prepared)?;
        buffer.extend_from_slice(b"\nendobj\n");
        self.write_bytes(&buffer)
    }

    fn write_xref(&mut self) -> Result<()> {
        self.write_bytes(b"xref\n")?;

        // One entry per number; object 0 always heads the free list
        let mut by_number: HashMap<u32, (u16, u64)> = HashMap::new();
        for (id, position) in &self.xref_positions {
            let slot = by_number.entry(id.number()).or_insert((id.generation(), *position));
            if id.generation() > slot.0 {
                *slot = (id.generation(), *position);
            }
        }

        let max_obj_num = self.max_object_number();
        self.write_bytes(format!("0 {}\n", max_obj_num + 1).as_bytes())?;
        self.write_bytes(b"0000000000 65535 f \n")?;

        // Gaps left by deleted objects become free entries
        for obj_num in 1..=max_obj_num {
            match by_number.get(&obj_num) {
                Some((generation, position)) => {
                    let entry = format!("{:010} {:05} n \n", position, generation);
                    self.write_bytes(entry.as_bytes())?;
                }
                None => self.write_bytes(b"0000000000 00000 f \n")?,
            }
        }

        Ok(())
    }

    fn write_trailer(&mut self, graph: &ObjectGraph, xref_position: u64) -> Result<()> {
        let info = graph.trailer();
        let mut trailer = Dictionary::new();
        trailer.set("Size", (self.max_object_number() + 1) as i64);
        if let Some(root) = info.root {
            trailer.set("Root", root);
        }
        if let Some(info_id) = info.info {
            trailer.set("Info", info_id);
        }
        if let Some(ref id) = info.id {
            trailer.set("ID", id.clone());
        }
        if let Some(encrypt) = info.encrypt {
            trailer.set("Encrypt", encrypt);
        }

        let mut buffer = b"trailer\n".to_vec();
        write_object_value(&mut buffer, &Object::Dictionary(trailer))?;
        buffer.extend_from_slice(format!("\nstartxref\n{xref_position}\n%%EOF\n").as_bytes());
        self.write_bytes(&buffer)
    }

    fn max_object_number(&self) -> u32 {
        self.xref_positions
            .keys()
            .map(|id| id.number())
            .max()
            .unwrap_or(0)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.current_position += data.len() as u64;
        Ok(())
    }
}

impl PdfWriter<BufWriter<std::fs::File>> {
    pub fn new(path: impl AsRef<Path>, config: WriterConfig) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::with_config(BufWriter::new(file), config))
    }
}

/// Serialize `graph`, encrypting it first when `security` is given.
///
/// With a security config this builds the handler from the graph, records
/// the file identifier and `/Encrypt` dictionary in the graph, then writes.
pub fn save_to_bytes(
    graph: &mut ObjectGraph,
    security: Option<&SecurityConfig>,
    config: WriterConfig,
) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut writer = PdfWriter::with_config(&mut buffer, config);
        write_with_security(&mut writer, graph, security)?;
    }
    Ok(buffer)
}

/// Like [`save_to_bytes`], but streams into a file.
pub fn save_to_file(
    graph: &mut ObjectGraph,
    path: impl AsRef<Path>,
    security: Option<&SecurityConfig>,
    config: WriterConfig,
) -> Result<()> {
    let mut writer = PdfWriter::new(path, config)?;
    write_with_security(&mut writer, graph, security)
}

fn write_with_security<W: Write>(
    writer: &mut PdfWriter<W>,
    graph: &mut ObjectGraph,
    security: Option<&SecurityConfig>,
) -> Result<()> {
    match security {
        Some(config) => {
            let mut handler = SecurityHandler::for_graph(graph, config)?;
            handler.encrypt(graph)?;
            writer.write_encrypted_graph(graph, &mut handler)
        }
        None => writer.write_graph(graph),
    }
}

/// Copy of `object` ready for output: operator streams rendered, `Length`
/// entries final, strings and stream data encrypted when `encrypt` is set.
fn prepare_object(object: &Object, compress: bool, encrypt: &mut Encryptor<'_>) -> Result<Object> {
    Ok(match object {
        Object::String(bytes) => Object::String(apply(encrypt, bytes)),
        Object::HexString(bytes) => Object::HexString(apply(encrypt, bytes)),
        Object::Array(items) => Object::Array(
            items
                .iter()
                .map(|item| prepare_object(item, compress, encrypt))
                .collect::<Result<_>>()?,
        ),
        Object::Dictionary(dict) => Object::Dictionary(prepare_dict(dict, compress, encrypt)?),
        Object::Stream(stream) => {
            let (dict, data) = stream.encode(compress)?;
            let dict = prepare_dict(&dict, compress, encrypt)?;
            Object::Stream(Stream::with_dictionary(dict, apply(encrypt, &data)))
        }
        other => other.clone(),
    })
}

fn prepare_dict(dict: &Dictionary, compress: bool, encrypt: &mut Encryptor<'_>) -> Result<Dictionary> {
    let mut out = Dictionary::with_capacity(dict.len());
    for (key, value) in dict {
        out.set(key.clone(), prepare_object(value, compress, encrypt)?);
    }
    Ok(out)
}

fn apply(encrypt: &mut Encryptor<'_>, bytes: &[u8]) -> Vec<u8> {
    match encrypt.as_deref_mut() {
        Some(f) => f(bytes),
        None => bytes.to_vec(),
    }
}

/// Write the textual form of a direct object.
pub fn write_object_value<W: Write>(out: &mut W, object: &Object) -> Result<()> {
    match object {
        Object::Null => out.write_all(b"null")?,
        Object::Boolean(b) => out.write_all(if *b { b"true" } else { b"false" })?,
        Object::Integer(i) => out.write_all(i.to_string().as_bytes())?,
        Object::Real(f) => out.write_all(format_real(*f).as_bytes())?,
        Object::String(s) => {
            out.write_all(b"(")?;
            out.write_all(&escape_literal_string(s))?;
            out.write_all(b")")?;
        }
        Object::HexString(s) => {
            out.write_all(b"<")?;
            out.write_all(hex::encode_upper(s).as_bytes())?;
            out.write_all(b">")?;
        }
        Object::Name(n) => {
            out.write_all(b"/")?;
            out.write_all(&escape_name(n))?;
        }
        Object::Array(arr) => {
            out.write_all(b"[")?;
            for (i, obj) in arr.iter().enumerate() {
                if i > 0 {
                    out.write_all(b" ")?;
                }
                write_object_value(out, obj)?;
            }
            out.write_all(b"]")?;
        }
        Object::Dictionary(dict) => write_dictionary(out, dict)?,
        Object::Stream(stream) => {
            let (dict, data) = stream.encode(false)?;
            write_dictionary(out, &dict)?;
            out.write_all(b"\nstream\n")?;
            out.write_all(&data)?;
            out.write_all(b"\nendstream")?;
        }
        Object::Reference(id) => out.write_all(id.to_string().as_bytes())?,
    }
    Ok(())
}

fn write_dictionary<W: Write>(out: &mut W, dict: &Dictionary) -> Result<()> {
    out.write_all(b"<<")?;
    for (key, value) in dict {
        out.write_all(b"\n/")?;
        out.write_all(&escape_name(key))?;
        out.write_all(b" ")?;
        write_object_value(out, value)?;
    }
    out.write_all(b"\n>>")?;
    Ok(())
}

fn format_real(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let formatted = format!("{value:.6}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

fn escape_literal_string(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'(' => out.extend_from_slice(b"\\("),
            b')' => out.extend_from_slice(b"\\)"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\n' => out.extend_from_slice(b"\\n"),
            _ => out.push(b),
        }
    }
    out
}

fn escape_name(name: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(name.len());
    for &b in name.as_bytes() {
        let delimiter = matches!(
            b,
            b'#' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
        );
        if (0x21..=0x7E).contains(&b) && !delimiter {
            out.push(b);
        } else {
            out.extend_from_slice(format!("#{b:02X}").as_bytes());
        }
    }
    out
}
