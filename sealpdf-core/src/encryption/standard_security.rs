//! Standard security handler (ISO 32000-1 §7.6.3, Adobe extension level 3)
//!
//! A [`SecurityHandler`] is built once per save from a [`SecurityConfig`].
//! Construction performs every derivation; afterwards the handler only
//! hands out per-object ciphers and the `/Encrypt` dictionary.

use crate::encryption::aes::{
    aes128_cbc_decrypt, aes128_cbc_encrypt, aes256_cbc_decrypt, aes256_cbc_encrypt,
};
use crate::encryption::encryption_dict::{CryptFilter, CryptFilterMethod, EncryptionDictionary};
use crate::encryption::key_derivation::{
    compute_file_key, compute_object_key, compute_owner_entry, compute_owner_entry_r5,
    compute_owner_key_entry_r5, compute_perms_entry, compute_user_entry, compute_user_entry_r5,
    compute_user_key_entry_r5,
};
use crate::encryption::password::{pad_password, process_password_r5};
use crate::encryption::rc4::rc4;
use crate::encryption::{PermissionFlags, Permissions};
use crate::error::{PdfError, Result};
use crate::graph::ObjectGraph;
use crate::objects::{Object, ObjectId};
use crate::version::PdfVersion;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

/// Identifier hashed when the document has no Info dictionary.
const NO_INFO_MARKER: &[u8] = b"sealpdf: document without info dictionary";

/// Passwords and permissions requested for a protected document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityConfig {
    pub owner_password: Option<String>,
    pub user_password: Option<String>,
    pub permissions: PermissionFlags,
}

impl SecurityConfig {
    /// No passwords and no permissions granted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Password needed to open the document.
    pub fn with_user_password(mut self, password: impl Into<String>) -> Self {
        self.user_password = Some(password.into());
        self
    }

    /// Password granting full access. Defaults to the user password.
    pub fn with_owner_password(mut self, password: impl Into<String>) -> Self {
        self.owner_password = Some(password.into());
        self
    }

    /// Operations allowed when opened with the user password.
    pub fn with_permissions(mut self, permissions: PermissionFlags) -> Self {
        self.permissions = permissions;
        self
    }
}

/// Cipher applied to object payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherKind {
    Rc4,
    Aes128,
    Aes256,
}

/// One row of the version table: which algorithm a format version gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Algorithm {
    pub version: u8,
    pub revision: u8,
    pub key_bits: u16,
    pub cipher: CipherKind,
}

impl Algorithm {
    /// Unknown versions and extension levels fall back to V1/R2.
    pub fn for_version(pdf_version: PdfVersion) -> Self {
        let (version, revision, key_bits, cipher) = match (
            pdf_version.major(),
            pdf_version.minor(),
            pdf_version.extension_level(),
        ) {
            (1, 4 | 5, None) => (2, 3, 128, CipherKind::Rc4),
            (1, 6 | 7, None) => (4, 4, 128, CipherKind::Aes128),
            (1, 7, Some(3)) => (5, 5, 256, CipherKind::Aes256),
            _ => (1, 2, 40, CipherKind::Rc4),
        };
        Self {
            version,
            revision,
            key_bits,
            cipher,
        }
    }

    /// File key length in bytes.
    pub fn key_length(&self) -> usize {
        self.key_bits as usize / 8
    }

    fn crypt_filter(&self) -> Option<CryptFilter> {
        match self.cipher {
            CipherKind::Rc4 => None,
            CipherKind::Aes128 => Some(CryptFilter::standard(CryptFilterMethod::AESV2)),
            CipherKind::Aes256 => Some(CryptFilter::standard(CryptFilterMethod::AESV3)),
        }
    }
}

/// Everything written into the `/Encrypt` dictionary, plus the file key.
#[derive(Clone)]
struct EncryptionState {
    file_key: Vec<u8>,
    owner_entry: Vec<u8>,
    user_entry: Vec<u8>,
    owner_key_entry: Option<[u8; 32]>,
    user_key_entry: Option<[u8; 32]>,
    perms: Option<[u8; 16]>,
}

/// Per-object cipher. RC4 and AES-128 keys are derived from the file key and
/// the object's reference; AES-256 uses the file key directly.
#[derive(Clone, PartialEq, Eq)]
pub enum ObjectCipher {
    Rc4(Vec<u8>),
    Aes128([u8; 16]),
    Aes256([u8; 32]),
}

impl ObjectCipher {
    /// Encrypt one string or stream payload. AES draws a fresh IV from `rng`
    /// on every call and prefixes it to the output.
    pub fn encrypt<R: RngCore + CryptoRng>(&self, data: &[u8], rng: &mut R) -> Vec<u8> {
        match self {
            ObjectCipher::Rc4(key) => rc4(key, data),
            ObjectCipher::Aes128(key) => {
                let mut iv = [0u8; 16];
                rng.fill_bytes(&mut iv);
                aes128_cbc_encrypt(key, &iv, data)
            }
            ObjectCipher::Aes256(key) => {
                let mut iv = [0u8; 16];
                rng.fill_bytes(&mut iv);
                aes256_cbc_encrypt(key, &iv, data)
            }
        }
    }

    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            ObjectCipher::Rc4(key) => Ok(rc4(key, data)),
            ObjectCipher::Aes128(key) => aes128_cbc_decrypt(key, data),
            ObjectCipher::Aes256(key) => aes256_cbc_decrypt(key, data),
        }
    }
}

impl std::fmt::Debug for ObjectCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ObjectCipher::Rc4(_) => "Rc4",
            ObjectCipher::Aes128(_) => "Aes128",
            ObjectCipher::Aes256(_) => "Aes256",
        };
        write!(f, "ObjectCipher::{name}(..)")
    }
}

/// Standard security handler for V1/R2, V2/R3, V4/R4 and V5/R5.
pub struct SecurityHandler<R = OsRng> {
    file_id: [u8; 16],
    algorithm: Algorithm,
    permissions: Permissions,
    state: EncryptionState,
    rng: R,
}

impl SecurityHandler<OsRng> {
    /// Handler for `graph`'s version, identified by the graph's Info dictionary.
    pub fn for_graph(graph: &ObjectGraph, config: &SecurityConfig) -> Result<Self> {
        let file_id = compute_file_identifier(graph)?;
        Self::new(graph.version(), config, file_id, OsRng)
    }
}

impl<R: RngCore + CryptoRng> SecurityHandler<R> {
    pub fn new(
        pdf_version: PdfVersion,
        config: &SecurityConfig,
        file_id: [u8; 16],
        mut rng: R,
    ) -> Result<Self> {
        if config.user_password.is_none() && config.owner_password.is_none() {
            return Err(PdfError::Configuration(
                "encryption requires a user or an owner password".to_string(),
            ));
        }

        let algorithm = Algorithm::for_version(pdf_version);
        let permissions = Permissions::from_flags(&config.permissions, algorithm.revision);
        let state = derive_state(&algorithm, config, permissions, &file_id, &mut rng)?;

        tracing::debug!(
            "Standard security handler for PDF {}: V={} R={} key={} bits",
            pdf_version,
            algorithm.version,
            algorithm.revision,
            algorithm.key_bits
        );

        Ok(Self {
            file_id,
            algorithm,
            permissions,
            state,
            rng,
        })
    }

    /// Record the file identifier in the trailer and register the `/Encrypt`
    /// dictionary. Calling it again replaces the dictionary in place.
    ///
    /// Fails when the trailer already names an `/Encrypt` reference that
    /// cannot be assigned.
    pub fn encrypt(&self, graph: &mut ObjectGraph) -> Result<ObjectId> {
        let id = Object::Array(vec![
            Object::hex_string(self.file_id),
            Object::hex_string(self.file_id),
        ]);
        graph.trailer_mut().id = Some(id);

        let dict = self.encryption_dictionary().to_dict();
        let encrypt_id = match graph.trailer().encrypt {
            Some(existing) => {
                graph.assign(existing, dict)?;
                existing
            }
            None => graph.register(dict),
        };
        graph.trailer_mut().encrypt = Some(encrypt_id);

        tracing::debug!("Registered Encrypt dictionary as {}", encrypt_id);
        Ok(encrypt_id)
    }

    /// Cipher for the object `number generation R`.
    pub fn object_cipher(&self, number: u32, generation: u16) -> ObjectCipher {
        let file_key = &self.state.file_key;
        match self.algorithm.cipher {
            CipherKind::Rc4 => {
                ObjectCipher::Rc4(compute_object_key(file_key, number, generation, false))
            }
            CipherKind::Aes128 => {
                let mut key = [0u8; 16];
                key.copy_from_slice(&compute_object_key(file_key, number, generation, true));
                ObjectCipher::Aes128(key)
            }
            CipherKind::Aes256 => {
                let mut key = [0u8; 32];
                key.copy_from_slice(file_key);
                ObjectCipher::Aes256(key)
            }
        }
    }

    /// Encryption closure for every string and stream of one indirect object.
    pub fn encrypt_fn(
        &mut self,
        number: u32,
        generation: u16,
    ) -> impl FnMut(&[u8]) -> Vec<u8> + '_ {
        tracing::trace!("Encrypting object {} {}", number, generation);
        let cipher = self.object_cipher(number, generation);
        let rng = &mut self.rng;
        move |data: &[u8]| cipher.encrypt(data, &mut *rng)
    }

    /// Entries of the `/Encrypt` dictionary for this handler.
    pub fn encryption_dictionary(&self) -> EncryptionDictionary {
        EncryptionDictionary {
            v: self.algorithm.version,
            r: self.algorithm.revision,
            length: self.algorithm.key_bits,
            crypt_filter: self.algorithm.crypt_filter(),
            o: self.state.owner_entry.clone(),
            u: self.state.user_entry.clone(),
            p: self.permissions,
            oe: self.state.owner_key_entry.map(|e| e.to_vec()),
            ue: self.state.user_key_entry.map(|e| e.to_vec()),
            perms: self.state.perms.map(|e| e.to_vec()),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// `/V` entry.
    pub fn version(&self) -> u8 {
        self.algorithm.version
    }

    /// `/R` entry.
    pub fn revision(&self) -> u8 {
        self.algorithm.revision
    }

    pub fn key_bits(&self) -> u16 {
        self.algorithm.key_bits
    }

    pub fn file_id(&self) -> &[u8; 16] {
        &self.file_id
    }

    /// Key all object keys derive from. Treat as secret.
    pub fn file_key(&self) -> &[u8] {
        &self.state.file_key
    }

    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    /// `/O`: 32 bytes up to R4, 48 bytes for R5.
    pub fn owner_entry(&self) -> &[u8] {
        &self.state.owner_entry
    }

    /// `/U`: 32 bytes up to R4, 48 bytes for R5.
    pub fn user_entry(&self) -> &[u8] {
        &self.state.user_entry
    }

    /// `/OE`, `/UE` and `/Perms` exist only for R5.
    pub fn owner_key_entry(&self) -> Option<&[u8; 32]> {
        self.state.owner_key_entry.as_ref()
    }

    pub fn user_key_entry(&self) -> Option<&[u8; 32]> {
        self.state.user_key_entry.as_ref()
    }

    pub fn perms_entry(&self) -> Option<&[u8; 16]> {
        self.state.perms.as_ref()
    }
}

impl<R> std::fmt::Debug for SecurityHandler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityHandler")
            .field("algorithm", &self.algorithm)
            .field("permissions", &self.permissions)
            .finish_non_exhaustive()
    }
}

fn derive_state<R: RngCore + CryptoRng>(
    algorithm: &Algorithm,
    config: &SecurityConfig,
    permissions: Permissions,
    file_id: &[u8; 16],
    rng: &mut R,
) -> Result<EncryptionState> {
    let user_password = config.user_password.as_deref().unwrap_or("");
    let owner_password = config.owner_password.as_deref().unwrap_or(user_password);

    match algorithm.revision {
        2..=4 => {
            let user_padded = pad_password(user_password)?;
            let owner_padded = pad_password(owner_password)?;
            let key_len = algorithm.key_length();
            let revision = algorithm.revision;

            let owner_entry = compute_owner_entry(&owner_padded, &user_padded, revision, key_len);
            let file_key = compute_file_key(
                &user_padded,
                &owner_entry,
                permissions.as_i32(),
                file_id,
                revision,
                key_len,
            );
            let user_entry = compute_user_entry(&file_key, file_id, revision);

            Ok(EncryptionState {
                file_key,
                owner_entry: owner_entry.to_vec(),
                user_entry: user_entry.to_vec(),
                owner_key_entry: None,
                user_key_entry: None,
                perms: None,
            })
        }
        5 => {
            let user = process_password_r5(user_password);
            let owner = process_password_r5(owner_password);

            let mut salts = [[0u8; 8]; 4];
            for salt in salts.iter_mut() {
                rng.fill_bytes(salt);
            }
            let [user_validation, user_key_salt, owner_validation, owner_key_salt] = salts;

            let mut file_key = [0u8; 32];
            rng.fill_bytes(&mut file_key);
            let mut perms_random = [0u8; 4];
            rng.fill_bytes(&mut perms_random);

            let user_entry = compute_user_entry_r5(&user, &user_validation, &user_key_salt);
            let owner_entry =
                compute_owner_entry_r5(&owner, &owner_validation, &owner_key_salt, &user_entry);
            let user_key_entry = compute_user_key_entry_r5(&user, &user_key_salt, &file_key);
            let owner_key_entry =
                compute_owner_key_entry_r5(&owner, &owner_key_salt, &user_entry, &file_key);
            let perms = compute_perms_entry(permissions.as_i32(), &file_key, perms_random);

            Ok(EncryptionState {
                file_key: file_key.to_vec(),
                owner_entry: owner_entry.to_vec(),
                user_entry: user_entry.to_vec(),
                owner_key_entry: Some(owner_key_entry),
                user_key_entry: Some(user_key_entry),
                perms: Some(perms),
            })
        }
        revision => Err(PdfError::UnsupportedAlgorithm {
            version: algorithm.version,
            revision,
        }),
    }
}

/// MD5 over the Info dictionary's `Key: value` lines.
///
/// Equal Info dictionaries give equal identifiers, so the legacy revisions
/// produce identical entries for identical documents.
pub fn compute_file_identifier(graph: &ObjectGraph) -> Result<[u8; 16]> {
    let info = match graph.trailer().info {
        Some(id) => graph.lookup_dict_id_maybe(id)?,
        None => None,
    };

    let Some(info) = info else {
        return Ok(md5::compute(NO_INFO_MARKER).0);
    };

    let mut data = Vec::new();
    for (key, value) in info {
        data.extend_from_slice(key.as_bytes());
        data.extend_from_slice(b": ");
        match graph.lookup_maybe(value, &[])? {
            Some(Object::String(bytes) | Object::HexString(bytes)) => {
                data.extend_from_slice(bytes)
            }
            Some(Object::Name(name)) => data.extend_from_slice(name.as_bytes()),
            Some(other) => crate::writer::write_object_value(&mut data, other)?,
            None => data.extend_from_slice(b"null"),
        }
        data.push(b'\n');
    }
    Ok(md5::compute(&data).0)
}
