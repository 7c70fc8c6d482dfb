//! ECDSA signature value with DER and compact (recoverable) encodings.
//!
//! A signature holds `r` and `s` as 32-byte big-endian integers plus the
//! optional recovery id and the compressed-key flag that the compact form
//! carries in its header byte. Construction does not range-check `r`/`s`;
//! encoding does, and so does the engine's validation path.

use num_bigint::BigUint;
use std::fmt;
use std::str::FromStr;

use crate::PrimitivesError;

/// The secp256k1 curve order N.
/// N = FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
pub(crate) const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

/// Half of the secp256k1 curve order (N/2), the low-S boundary.
pub(crate) const HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B,
    0x20, 0xA0,
];

/// Length of the compact encoding: header byte, 32-byte R, 32-byte S.
pub const COMPACT_LEN: usize = 65;

/// Base of the compact header byte.
const COMPACT_HEADER_BASE: u8 = 27;

/// Added to the compact header when the signing key is compressed.
const COMPACT_COMPRESSED_FLAG: u8 = 4;

/// Wire encoding of a [`Signature`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureFormat {
    /// ASN.1 `SEQUENCE { INTEGER r, INTEGER s }`, variable length.
    Der,
    /// `header || r || s`, 65 bytes, header = 27 + recovery id (+4 if compressed).
    Compact,
}

/// The accepted shapes of signature input, resolved once at the boundary.
#[derive(Clone, Debug)]
pub enum SignatureInput {
    /// DER or compact bytes.
    Bytes(Vec<u8>),
    /// Hex of DER or compact bytes.
    Hex(String),
    /// Raw big-endian components.
    Fields {
        r: [u8; 32],
        s: [u8; 32],
        recovery_id: Option<u8>,
    },
}

/// An ECDSA signature `(r, s)` with optional recovery metadata.
#[derive(Clone, Debug)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
    recovery_id: Option<u8>,
    compressed: bool,
}

impl Signature {
    /// Create a signature from raw R and S 32-byte big-endian arrays.
    ///
    /// No recovery id is set and the compressed flag defaults to `true`.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature {
            r,
            s,
            recovery_id: None,
            compressed: true,
        }
    }

    /// Create a signature from decimal strings of R and S.
    ///
    /// # Returns
    /// `Format` for a non-decimal string, `Range` for a value wider than
    /// 256 bits. Values are not checked against the curve order.
    pub fn from_decimal(r: &str, s: &str) -> Result<Self, PrimitivesError> {
        Ok(Self::new(decimal_to_32_bytes(r)?, decimal_to_32_bytes(s)?))
    }

    /// Resolve any [`SignatureInput`] shape into a signature.
    pub fn from_input(input: SignatureInput) -> Result<Self, PrimitivesError> {
        match input {
            SignatureInput::Bytes(bytes) => Self::decode(&bytes),
            SignatureInput::Hex(hex_str) => {
                let bytes = hex::decode(hex_str.trim())
                    .map_err(|e| PrimitivesError::Format(format!("signature hex: {}", e)))?;
                Self::decode(&bytes)
            }
            SignatureInput::Fields { r, s, recovery_id } => {
                let sig = Self::new(r, s);
                match recovery_id {
                    Some(i) => sig.with_recovery_id(i, true),
                    None => Ok(sig),
                }
            }
        }
    }

    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// The recovery id, if one was computed or decoded.
    pub fn recovery_id(&self) -> Option<u8> {
        self.recovery_id
    }

    /// Whether the signing key is presented compressed (compact header bit).
    pub fn compressed(&self) -> bool {
        self.compressed
    }

    /// Attach a recovery id and compressed flag.
    ///
    /// # Returns
    /// `Range` if `recovery_id` is not in `0..=3`.
    pub fn with_recovery_id(
        mut self,
        recovery_id: u8,
        compressed: bool,
    ) -> Result<Self, PrimitivesError> {
        if recovery_id > 3 {
            return Err(PrimitivesError::Range(
                "i must be equal to 0, 1, 2, or 3".to_string(),
            ));
        }
        self.recovery_id = Some(recovery_id);
        self.compressed = compressed;
        Ok(self)
    }

    /// `true` iff both `r` and `s` lie in `[1, n-1]`.
    pub fn is_in_range(&self) -> bool {
        in_scalar_range(&self.r) && in_scalar_range(&self.s)
    }

    /// `true` iff `s <= n/2`.
    pub fn has_low_s(&self) -> bool {
        !is_greater_than(&self.s, &HALF_ORDER)
    }

    /// Return the low-S form: `s` replaced by `n - s` when `s > n/2`.
    ///
    /// Flipping `s` negates the nonce point, so bit 0 of a stored recovery
    /// id is flipped along with it.
    pub fn to_low_s(&self) -> Self {
        if self.has_low_s() {
            return self.clone();
        }
        Signature {
            r: self.r,
            s: subtract_from_order(&self.s),
            recovery_id: self.recovery_id.map(|i| i ^ 1),
            compressed: self.compressed,
        }
    }

    /// Return the high-S twin: `s` replaced by `n - s` when `s <= n/2`.
    ///
    /// Both forms verify under a lenient verifier; bit 0 of a stored
    /// recovery id is flipped as in [`Signature::to_low_s`].
    pub fn to_high_s(&self) -> Self {
        if !self.has_low_s() {
            return self.clone();
        }
        Signature {
            r: self.r,
            s: subtract_from_order(&self.s),
            recovery_id: self.recovery_id.map(|i| i ^ 1),
            compressed: self.compressed,
        }
    }

    /// Serialize in the requested format.
    ///
    /// # Returns
    /// `Range` if `r` or `s` is zero or `>= n`, or (compact only) if no
    /// recovery id is set.
    pub fn encode(&self, format: SignatureFormat) -> Result<Vec<u8>, PrimitivesError> {
        match format {
            SignatureFormat::Der => self.to_der(),
            SignatureFormat::Compact => Ok(self.to_compact()?.to_vec()),
        }
    }

    /// Parse either encoding. A leading `0x30` selects DER; anything else
    /// must be a 65-byte compact signature.
    pub fn decode(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        match bytes.first() {
            Some(0x30) => Self::from_der(bytes),
            Some(_) if bytes.len() == COMPACT_LEN => Self::from_compact(bytes),
            _ => Err(PrimitivesError::Format(
                "unrecognized signature encoding".to_string(),
            )),
        }
    }

    /// Parse a DER-encoded ECDSA signature.
    ///
    /// Expected format: `0x30 <len> 0x02 <r_len> <r> 0x02 <s_len> <s>`, with
    /// `<len>` covering exactly the rest of the buffer. Integers must be
    /// minimally encoded and non-negative.
    ///
    /// # Returns
    /// `Format` for malformed structure or for `r`/`s` outside `[1, n-1]`.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() < 8 {
            return Err(der_error("too short"));
        }
        if bytes[0] != 0x30 {
            return Err(der_error("no header magic"));
        }
        let sig_len = bytes[1] as usize;
        if sig_len + 2 != bytes.len() {
            return Err(der_error("bad length"));
        }

        let mut idx = 2;
        let r_bytes = read_der_int(bytes, &mut idx, "R")?;
        let s_bytes = read_der_int(bytes, &mut idx, "S")?;
        if idx != bytes.len() {
            return Err(der_error("trailing bytes after S"));
        }

        let r = to_32_bytes(r_bytes).map_err(|_| der_error("R too large"))?;
        let s = to_32_bytes(s_bytes).map_err(|_| der_error("S too large"))?;
        check_decoded_range(&r, &s)?;
        Ok(Self::new(r, s))
    }

    /// Serialize as canonical DER.
    ///
    /// Each integer is minimal, with a single `0x00` pad only when its high
    /// bit is set. `s` is written as stored; normalization is the signer's job.
    pub fn to_der(&self) -> Result<Vec<u8>, PrimitivesError> {
        self.check_encode_range()?;
        Ok(self.der_bytes())
    }

    /// Parse a 65-byte compact signature.
    ///
    /// # Returns
    /// `Format` for a wrong length, a header outside `27..=34`, or `r`/`s`
    /// outside `[1, n-1]`.
    pub fn from_compact(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != COMPACT_LEN {
            return Err(PrimitivesError::Format(format!(
                "compact signature must be {} bytes, got {}",
                COMPACT_LEN,
                bytes.len()
            )));
        }
        let header = bytes[0]
            .checked_sub(COMPACT_HEADER_BASE)
            .filter(|h| *h < 2 * COMPACT_COMPRESSED_FLAG)
            .ok_or_else(|| {
                PrimitivesError::Format(format!("invalid compact header byte {}", bytes[0]))
            })?;
        let compressed = header >= COMPACT_COMPRESSED_FLAG;
        let recovery_id = header % COMPACT_COMPRESSED_FLAG;

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[1..33]);
        s.copy_from_slice(&bytes[33..65]);
        check_decoded_range(&r, &s)?;

        Ok(Signature {
            r,
            s,
            recovery_id: Some(recovery_id),
            compressed,
        })
    }

    /// Serialize as `header || r || s`.
    ///
    /// # Returns
    /// `Range` if no recovery id is set or `r`/`s` are out of range.
    pub fn to_compact(&self) -> Result<[u8; COMPACT_LEN], PrimitivesError> {
        let recovery_id = self.recovery_id.ok_or_else(|| {
            PrimitivesError::Range("compact encoding requires a recovery id".to_string())
        })?;
        self.check_encode_range()?;

        let mut out = [0u8; COMPACT_LEN];
        out[0] = COMPACT_HEADER_BASE
            + recovery_id
            + if self.compressed { COMPACT_COMPRESSED_FLAG } else { 0 };
        out[1..33].copy_from_slice(&self.r);
        out[33..65].copy_from_slice(&self.s);
        Ok(out)
    }

    fn check_encode_range(&self) -> Result<(), PrimitivesError> {
        if !in_scalar_range(&self.r) {
            return Err(PrimitivesError::Range("r must be in [1, n-1]".to_string()));
        }
        if !in_scalar_range(&self.s) {
            return Err(PrimitivesError::Range("s must be in [1, n-1]".to_string()));
        }
        Ok(())
    }

    /// DER layout without range checks, used for display.
    fn der_bytes(&self) -> Vec<u8> {
        let rb = canonicalize_int(&self.r);
        let sb = canonicalize_int(&self.s);

        let total_len = 6 + rb.len() + sb.len();
        let mut out = Vec::with_capacity(total_len);
        out.push(0x30);
        out.push((total_len - 2) as u8);
        out.push(0x02);
        out.push(rb.len() as u8);
        out.extend_from_slice(&rb);
        out.push(0x02);
        out.push(sb.len() as u8);
        out.extend_from_slice(&sb);
        out
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.r == other.r && self.s == other.s
    }
}

impl Eq for Signature {}

/// Hex of the DER layout.
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.der_bytes()))
    }
}

impl FromStr for Signature {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_input(SignatureInput::Hex(s.to_string()))
    }
}

fn der_error(msg: &str) -> PrimitivesError {
    PrimitivesError::Format(format!("malformed signature: {}", msg))
}

/// Read one `0x02 <len> <bytes>` INTEGER starting at `*idx`.
fn read_der_int<'a>(
    data: &'a [u8],
    idx: &mut usize,
    name: &str,
) -> Result<&'a [u8], PrimitivesError> {
    if data.get(*idx) != Some(&0x02) {
        return Err(der_error(&format!("no int marker for {}", name)));
    }
    let len = *data
        .get(*idx + 1)
        .ok_or_else(|| der_error(&format!("missing {} length", name)))? as usize;
    let start = *idx + 2;
    if len == 0 || start + len > data.len() {
        return Err(der_error(&format!("bogus {} length", name)));
    }
    if data[start] & 0x80 != 0 {
        return Err(der_error(&format!("{} is negative", name)));
    }
    if len > 1 && data[start] == 0x00 && data[start + 1] & 0x80 == 0 {
        return Err(der_error(&format!("{} has excess padding", name)));
    }
    *idx = start + len;
    Ok(&data[start..start + len])
}

fn check_decoded_range(r: &[u8; 32], s: &[u8; 32]) -> Result<(), PrimitivesError> {
    if !in_scalar_range(r) {
        return Err(PrimitivesError::Format(
            "signature R is not in [1, n-1]".to_string(),
        ));
    }
    if !in_scalar_range(s) {
        return Err(PrimitivesError::Format(
            "signature S is not in [1, n-1]".to_string(),
        ));
    }
    Ok(())
}

fn decimal_to_32_bytes(value: &str) -> Result<[u8; 32], PrimitivesError> {
    let n = BigUint::parse_bytes(value.trim().as_bytes(), 10)
        .ok_or_else(|| PrimitivesError::Format(format!("not a decimal integer: {}", value)))?;
    to_32_bytes(&n.to_bytes_be())
}

/// Canonicalize a 32-byte big-endian integer for DER: strip leading zeros,
/// then prepend `0x00` if the high bit is set.
fn canonicalize_int(val: &[u8; 32]) -> Vec<u8> {
    let start = val.iter().position(|&b| b != 0).unwrap_or(31);
    let trimmed = &val[start..];
    if trimmed[0] & 0x80 != 0 {
        let mut out = Vec::with_capacity(trimmed.len() + 1);
        out.push(0x00);
        out.extend_from_slice(trimmed);
        out
    } else {
        trimmed.to_vec()
    }
}

/// Left-pad a big-endian integer of up to 32 significant bytes.
pub(crate) fn to_32_bytes(bytes: &[u8]) -> Result<[u8; 32], PrimitivesError> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let trimmed = &bytes[start..];
    if trimmed.len() > 32 {
        return Err(PrimitivesError::Range(
            "integer value too large for 32 bytes".to_string(),
        ));
    }
    let mut out = [0u8; 32];
    out[32 - trimmed.len()..].copy_from_slice(trimmed);
    Ok(out)
}

pub(crate) fn is_zero(val: &[u8; 32]) -> bool {
    val.iter().all(|&b| b == 0)
}

/// `true` iff `0 < val < n`.
pub(crate) fn in_scalar_range(val: &[u8; 32]) -> bool {
    !is_zero(val) && is_less_than(val, &CURVE_ORDER)
}

/// Big-endian comparison: `a < b`.
pub(crate) fn is_less_than(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a < b
}

/// Big-endian comparison: `a > b`.
pub(crate) fn is_greater_than(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a > b
}

/// Compute `n - val`.
pub(crate) fn subtract_from_order(val: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;
    for i in (0..32).rev() {
        let diff = CURVE_ORDER[i] as i32 - val[i] as i32 - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }
    result
}

/// Compute `val + n`, or `None` if the sum does not fit in 256 bits.
pub(crate) fn add_order(val: &[u8; 32]) -> Option<[u8; 32]> {
    let mut result = [0u8; 32];
    let mut carry: u16 = 0;
    for i in (0..32).rev() {
        let sum = CURVE_ORDER[i] as u16 + val[i] as u16 + carry;
        result[i] = sum as u8;
        carry = sum >> 8;
    }
    if carry == 0 {
        Some(result)
    } else {
        None
    }
}
