//! User access permissions (ISO 32000-1 Table 22)

/// Reserved bits for revision 2: bits 7-32 set.
const R2_BASE: u32 = 0xFFFF_FFC0;
/// Reserved bits for revision 3 and later: bits 7-8 and 13-32 set.
const R3_BASE: u32 = 0xFFFF_F0C0;

const PRINT: u32 = 1 << 2;
const MODIFY: u32 = 1 << 3;
const COPY: u32 = 1 << 4;
const ANNOTATE: u32 = 1 << 5;
const FILL_FORMS: u32 = 1 << 8;
const ACCESSIBILITY: u32 = 1 << 9;
const ASSEMBLE: u32 = 1 << 10;
const PRINT_HIGH_QUALITY: u32 = 1 << 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintingPermission {
    #[default]
    None,
    /// Printing allowed; treated as low resolution on revision 3+
    Yes,
    LowResolution,
    HighResolution,
}

/// What a user opening the document with the user password may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionFlags {
    pub printing: PrintingPermission,
    pub modifying: bool,
    pub copying: bool,
    pub annotating: bool,
    pub filling_forms: bool,
    pub content_accessibility: bool,
    pub document_assembly: bool,
}

impl PermissionFlags {
    pub fn all() -> Self {
        Self {
            printing: PrintingPermission::HighResolution,
            modifying: true,
            copying: true,
            annotating: true,
            filling_forms: true,
            content_accessibility: true,
            document_assembly: true,
        }
    }
}

/// Encoded 32-bit permission mask (the `P` entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    bits: u32,
}

impl Permissions {
    /// Encode `flags` for the given security handler revision.
    ///
    /// Revision 2 only knows the print, modify, copy and annotate bits; the
    /// rest of the flags are ignored there.
    pub fn from_flags(flags: &PermissionFlags, revision: u8) -> Self {
        let mut perm = Self::from_bits(if revision >= 3 { R3_BASE } else { R2_BASE });

        perm.set(PRINT, flags.printing != PrintingPermission::None);
        perm.set(MODIFY, flags.modifying);
        perm.set(COPY, flags.copying);
        perm.set(ANNOTATE, flags.annotating);

        if revision >= 3 {
            perm.set(FILL_FORMS, flags.filling_forms);
            perm.set(ACCESSIBILITY, flags.content_accessibility);
            perm.set(ASSEMBLE, flags.document_assembly);
            perm.set(
                PRINT_HIGH_QUALITY,
                flags.printing == PrintingPermission::HighResolution,
            );
        }

        perm
    }

    pub fn from_bits(bits: u32) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Two's-complement view written into the `P` entry.
    pub fn as_i32(&self) -> i32 {
        self.bits as i32
    }

    fn set(&mut self, bit: u32, allow: bool) {
        if allow {
            self.bits |= bit;
        } else {
            self.bits &= !bit;
        }
    }

    pub fn can_print(&self) -> bool {
        self.bits & PRINT != 0
    }

    pub fn can_modify_contents(&self) -> bool {
        self.bits & MODIFY != 0
    }

    pub fn can_copy(&self) -> bool {
        self.bits & COPY != 0
    }

    pub fn can_modify_annotations(&self) -> bool {
        self.bits & ANNOTATE != 0
    }

    pub fn can_fill_forms(&self) -> bool {
        self.bits & FILL_FORMS != 0
    }

    pub fn can_access_for_accessibility(&self) -> bool {
        self.bits & ACCESSIBILITY != 0
    }

    pub fn can_assemble(&self) -> bool {
        self.bits & ASSEMBLE != 0
    }

    pub fn can_print_high_quality(&self) -> bool {
        self.bits & PRINT_HIGH_QUALITY != 0
    }
}
