//! Seeded placeholder images.
//!
//! The service serves a deterministic image for `/seed/{seed}/{w}/{h}`, so a
//! preview and a full-size URL built from the same seed show the same
//! picture at two sizes.

use super::ProviderError;
use crate::types::{ImageDescriptor, PREVIEW_SIZE};
use rand::Rng;

const SEED_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SEED_LEN: usize = 11;

/// A random base-36 token. Uniqueness across a batch is not guaranteed.
pub fn random_seed() -> String {
    let mut rng = rand::thread_rng();
    (0..SEED_LEN)
        .map(|_| SEED_ALPHABET[rng.gen_range(0..SEED_ALPHABET.len())] as char)
        .collect()
}

/// `{base}/seed/{seed}/{width}/{height}`, with the seed percent-encoded.
pub fn seed_url(base: &str, seed: &str, width: u32, height: u32) -> Result<String, ProviderError> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| ProviderError::InvalidUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ProviderError::InvalidUrl(format!("{base}: cannot be a base URL")))?
        .pop_if_empty()
        .extend([
            "seed",
            seed,
            width.to_string().as_str(),
            height.to_string().as_str(),
        ]);
    Ok(url.to_string())
}

/// Descriptor for one seed: 400×400 preview, `size`×`size` download.
pub fn descriptor(base: &str, seed: &str, size: u32) -> Result<ImageDescriptor, ProviderError> {
    Ok(ImageDescriptor {
        preview_url: seed_url(base, seed, PREVIEW_SIZE, PREVIEW_SIZE)?,
        download_url: seed_url(base, seed, size, size)?,
        caption: seed.to_string(),
    })
}

/// `count` descriptors with fresh random seeds.
pub fn generate(base: &str, count: usize, size: u32) -> Result<Vec<ImageDescriptor>, ProviderError> {
    (0..count)
        .map(|_| descriptor(base, &random_seed(), size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://picsum.photos";

    #[test]
    fn seed_is_base36() {
        let seed = random_seed();
        assert_eq!(seed.len(), SEED_LEN);
        assert!(seed.bytes().all(|b| SEED_ALPHABET.contains(&b)));
    }

    #[test]
    fn seed_url_shape() {
        assert_eq!(
            seed_url(BASE, "abc123", 400, 400).unwrap(),
            "https://picsum.photos/seed/abc123/400/400"
        );
    }

    #[test]
    fn seed_url_tolerates_trailing_slash() {
        assert_eq!(
            seed_url("https://picsum.photos/", "x", 10, 10).unwrap(),
            "https://picsum.photos/seed/x/10/10"
        );
    }

    #[test]
    fn seed_url_encodes_seed() {
        let url = seed_url(BASE, "a b/c", 400, 400).unwrap();
        assert_eq!(url, "https://picsum.photos/seed/a%20b%2Fc/400/400");
    }

    #[test]
    fn seed_url_rejects_garbage_base() {
        assert!(seed_url("not a url", "x", 1, 1).is_err());
    }

    #[test]
    fn preview_and_download_share_seed() {
        let items = generate(BASE, 4, 800).unwrap();
        assert_eq!(items.len(), 4);
        for item in &items {
            assert!(item.preview_url.contains("/400/400"));
            assert!(item.download_url.contains("/800/800"));
            let token = format!("/seed/{}/", item.caption);
            assert!(item.preview_url.contains(&token));
            assert!(item.download_url.contains(&token));
        }
    }

    #[test]
    fn two_batches_differ_but_share_shape() {
        let a = generate(BASE, 6, 1000).unwrap();
        let b = generate(BASE, 6, 1000).unwrap();
        assert_eq!(a.len(), b.len());
        assert_ne!(a, b);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(
                x.preview_url.replace(&x.caption, "SEED"),
                y.preview_url.replace(&y.caption, "SEED")
            );
        }
    }
}
