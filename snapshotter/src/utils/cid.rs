use data_encoding::BASE32_NOPAD;
use sha2::{Digest, Sha256};

/// CIDv1 prefix for raw bytes hashed with sha2-256 (version, codec, multihash code, digest length)
const RAW_SHA256_CID_PREFIX: [u8; 4] = [0x01, 0x55, 0x12, 0x20];

/// Multibase prefix of lowercase base32
const BASE32_MULTIBASE: char = 'b';

/// Content identifier computed locally, identical to what an IPFS node returns for
/// `add?cid-version=1&raw-leaves=true` of a single-block payload.
pub fn local_content_id(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let mut cid = Vec::with_capacity(RAW_SHA256_CID_PREFIX.len() + digest.len());
    cid.extend_from_slice(&RAW_SHA256_CID_PREFIX);
    cid.extend_from_slice(&digest);

    let mut encoded = String::with_capacity(1 + cid.len() * 8 / 5 + 1);
    encoded.push(BASE32_MULTIBASE);
    encoded.push_str(&BASE32_NOPAD.encode(&cid).to_ascii_lowercase());
    encoded
}
