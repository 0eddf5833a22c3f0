//! Approximate memory used by a tile's content
//!
//! Order-of-magnitude estimate for cache budgeting, not exact GPU usage.
//! Resources shared between meshes or materials are counted once, keyed by
//! allocation identity.

use std::collections::HashSet;
use std::sync::Arc;

use super::container::ContentContainer;

/// Bytes per texel assumed for every texture (RGBA8)
pub const TEXTURE_BYTES_PER_PIXEL: u64 = 4;

fn first_visit<T>(seen: &mut HashSet<*const ()>, resource: &Arc<T>) -> bool {
    seen.insert(Arc::as_ptr(resource) as *const ())
}

/// Sum vertex, index and texture bytes of a container.
///
/// `count_mipmaps` adds ~1/3 for textures that generate a mip chain.
pub fn calculate_bytes_used(container: &ContentContainer, count_mipmaps: bool) -> u64 {
    let mut seen = HashSet::new();
    let mut total = 0.0_f64;

    for mesh in &container.meshes {
        let Some(geometry) = &mesh.geometry else {
            continue;
        };
        if !first_visit(&mut seen, geometry) {
            continue;
        }

        for (_, buffer) in &geometry.vertex_buffers {
            if first_visit(&mut seen, buffer) {
                total += buffer.byte_len() as f64;
            }
        }

        if let Some(indices) = &geometry.indices {
            total += indices.byte_len() as f64;
        }
    }

    for material in &container.materials {
        for texture in &material.textures {
            if !first_visit(&mut seen, texture) {
                continue;
            }
            if texture.width == 0 || texture.height == 0 {
                continue;
            }

            let mut bytes = texture.width as f64 * texture.height as f64 * TEXTURE_BYTES_PER_PIXEL as f64;
            if count_mipmaps && texture.generate_mipmaps {
                bytes *= 4.0 / 3.0;
            }
            total += bytes;
        }
    }

    total.round() as u64
}
