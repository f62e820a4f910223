//! The `/Encrypt` dictionary written for the standard security handler

use crate::encryption::Permissions;
use crate::objects::{Dictionary, Object};

/// Name of the single crypt filter used for both strings and streams.
pub const STANDARD_CRYPT_FILTER: &str = "StdCF";

/// Crypt filter method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptFilterMethod {
    /// AES-128
    AESV2,
    /// AES-256
    AESV3,
}

impl CryptFilterMethod {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            CryptFilterMethod::AESV2 => "AESV2",
            CryptFilterMethod::AESV3 => "AESV3",
        }
    }

    /// Key length in bytes, as written in the filter's `Length` entry.
    pub fn key_length(&self) -> i64 {
        match self {
            CryptFilterMethod::AESV2 => 16,
            CryptFilterMethod::AESV3 => 32,
        }
    }
}

/// Standard crypt filter definition
#[derive(Debug, Clone, PartialEq)]
pub struct CryptFilter {
    pub method: CryptFilterMethod,
}

impl CryptFilter {
    pub fn standard(method: CryptFilterMethod) -> Self {
        Self { method }
    }

    pub fn to_dict(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("AuthEvent", Object::name("DocOpen"));
        dict.set("CFM", Object::name(self.method.pdf_name()));
        dict.set("Length", self.method.key_length());
        dict
    }
}

/// PDF encryption dictionary
#[derive(Debug, Clone, PartialEq)]
pub struct EncryptionDictionary {
    /// Algorithm version (`V`)
    pub v: u8,
    /// Security handler revision (`R`)
    pub r: u8,
    /// Key length in bits; only written for `V` >= 2
    pub length: u16,
    pub crypt_filter: Option<CryptFilter>,
    /// Owner password entry (`O`)
    pub o: Vec<u8>,
    /// User password entry (`U`)
    pub u: Vec<u8>,
    pub p: Permissions,
    /// Owner-wrapped file key (`OE`, revision 5)
    pub oe: Option<Vec<u8>>,
    /// User-wrapped file key (`UE`, revision 5)
    pub ue: Option<Vec<u8>>,
    /// Encrypted permissions (`Perms`, revision 5)
    pub perms: Option<Vec<u8>>,
}

impl EncryptionDictionary {
    pub fn to_dict(&self) -> Dictionary {
        let mut dict = Dictionary::new();

        dict.set("Filter", Object::name("Standard"));
        dict.set("V", self.v as i64);

        if self.v >= 2 {
            dict.set("Length", self.length as i64);
        }

        if let Some(ref filter) = self.crypt_filter {
            let mut cf_dict = Dictionary::new();
            cf_dict.set(STANDARD_CRYPT_FILTER, filter.to_dict());
            dict.set("CF", cf_dict);
            dict.set("StmF", Object::name(STANDARD_CRYPT_FILTER));
            dict.set("StrF", Object::name(STANDARD_CRYPT_FILTER));
        }

        dict.set("R", self.r as i64);
        dict.set("O", Object::hex_string(&self.o));
        dict.set("U", Object::hex_string(&self.u));
        dict.set("P", self.p.as_i32() as i64);

        if let Some(ref oe) = self.oe {
            dict.set("OE", Object::hex_string(oe));
        }
        if let Some(ref ue) = self.ue {
            dict.set("UE", Object::hex_string(ue));
        }
        if let Some(ref perms) = self.perms {
            dict.set("Perms", Object::hex_string(perms));
        }

        dict
    }
}
