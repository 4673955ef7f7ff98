//! ustar header block recognition.

/// Size of a tar header block.
pub const BLOCK_SIZE: usize = 512;

/// Whether `block` starts with a ustar header whose checksum verifies.
///
/// Accepts the POSIX (`ustar\0` `00`) and GNU (`ustar ` ` \0`) variants.
#[must_use]
pub fn is_tar_header(block: &[u8]) -> bool {
    let Some(block) = block.get(..BLOCK_SIZE) else {
        return false;
    };
    let header = tar::Header::from_byte_slice(block);
    if header.as_ustar().is_none() && header.as_gnu().is_none() {
        return false;
    }

    let Ok(stored) = header.cksum() else {
        return false;
    };
    let mut recomputed = header.clone();
    recomputed.set_cksum();
    recomputed.cksum().is_ok_and(|sum| sum == stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_tarball;

    #[test]
    fn test_builder_output_is_tar_header() {
        assert!(is_tar_header(&sample_tarball()));
    }

    #[test]
    fn test_gnu_header_is_tar_header() {
        let mut header = tar::Header::new_gnu();
        header.set_path("qc/summary.txt").expect("valid path");
        header.set_size(0);
        header.set_cksum();
        assert!(is_tar_header(header.as_bytes()));
    }

    #[test]
    fn test_old_style_header_is_not_tar_header() {
        let mut header = tar::Header::new_old();
        header.set_path("qc/summary.txt").expect("valid path");
        header.set_size(0);
        header.set_cksum();
        assert!(!is_tar_header(header.as_bytes()));
    }

    #[test]
    fn test_zero_block_is_not_tar_header() {
        assert!(!is_tar_header(&[0u8; BLOCK_SIZE]));
    }

    #[test]
    fn test_short_block_is_not_tar_header() {
        let tar = sample_tarball();
        assert!(!is_tar_header(&tar[..BLOCK_SIZE - 1]));
    }

    #[test]
    fn test_wrong_magic_is_not_tar_header() {
        let mut tar = sample_tarball();
        tar[257] = b'X';
        assert!(!is_tar_header(&tar));
    }

    #[test]
    fn test_checksum_mismatch_is_not_tar_header() {
        let mut tar = sample_tarball();
        tar[100] = tar[100].wrapping_add(1);
        assert!(!is_tar_header(&tar));
    }

    #[test]
    fn test_unparseable_checksum_is_not_tar_header() {
        let mut tar = sample_tarball();
        tar[148..156].copy_from_slice(b"99999999");
        assert!(!is_tar_header(&tar));
    }
}
