use sha2::Digest;

const HASH_BLOCK_U64_COUNT: usize = 4;

pub type HashBlock = [u64; HASH_BLOCK_U64_COUNT];

pub const HASH_ZERO_BLOCK: HashBlock = [0; HASH_BLOCK_U64_COUNT];

/// SHA-256 of `input`, packed into little-endian u64 words.
#[inline]
pub fn hash(input: &[u8]) -> HashBlock {
    let digest = sha2::Sha256::digest(input);
    let mut destination = HASH_ZERO_BLOCK;
    for (word, chunk) in destination.iter_mut().zip(digest.chunks_exact(8)) {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(chunk);
        *word = u64::from_le_bytes(bytes);
    }
    destination
}
