//! Little-endian binary form of `ConvexData`.
//!
//! Layout: flags `u32`, vertex count `i32`, vertices `3 x f32`, face count
//! `i32`, then per face normal `3 x f32`, offset `f32`, id count `i32` and the
//! ids as `i32`. Edge and extra half-spaces are derived data and are rebuilt
//! on read.

use std::io::{Read, Write};

use super::{ConvexData, CovFace};
use crate::error::{ConvexError, Result};
use crate::geom3::{HalfSpace, Vec3};

/// Upper bound on counts accepted from a stream.
const MAX_COUNT: usize = 1 << 24;
/// Headers are untrusted; vectors grow past this as payload arrives.
const MAX_PREALLOC: usize = 4096;

fn put_u32(w: &mut impl Write, v: u32) -> Result<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn put_i32(w: &mut impl Write, v: usize) -> Result<()> {
    let v = i32::try_from(v).map_err(|_| ConvexError::format(format!("count {v} exceeds i32")))?;
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn put_f32(w: &mut impl Write, v: f64) -> Result<()> {
    w.write_all(&(v as f32).to_le_bytes())?;
    Ok(())
}

fn put_vec3(w: &mut impl Write, v: &Vec3) -> Result<()> {
    for c in v.iter() {
        put_f32(w, *c)?;
    }
    Ok(())
}

fn get_4(r: &mut impl Read) -> Result<[u8; 4]> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(b)
}

fn get_count(r: &mut impl Read, what: &str) -> Result<usize> {
    let v = i32::from_le_bytes(get_4(r)?);
    usize::try_from(v)
        .ok()
        .filter(|n| *n <= MAX_COUNT)
        .ok_or_else(|| ConvexError::format(format!("bad {what} count {v}")))
}

fn get_f32(r: &mut impl Read) -> Result<f64> {
    Ok(f32::from_le_bytes(get_4(r)?) as f64)
}

fn get_vec3(r: &mut impl Read) -> Result<Vec3> {
    Ok(Vec3::new(get_f32(r)?, get_f32(r)?, get_f32(r)?))
}

impl ConvexData {
    pub fn write_to(&self, w: &mut impl Write) -> Result<()> {
        put_u32(w, self.flags)?;
        put_i32(w, self.vertices.len())?;
        for v in &self.vertices {
            put_vec3(w, v)?;
        }
        put_i32(w, self.faces.len())?;
        for f in &self.faces {
            put_vec3(w, &f.plane.n)?;
            put_f32(w, f.plane.d)?;
            put_i32(w, f.vids.len())?;
            for &id in &f.vids {
                put_i32(w, id)?;
            }
        }
        Ok(())
    }

    /// Read a hull written by `write_to`. Ids must index the vertex list.
    pub fn read_from(r: &mut impl Read) -> Result<Self> {
        let flags = u32::from_le_bytes(get_4(r)?);
        let nv = get_count(r, "vertex")?;
        let mut vertices = Vec::with_capacity(nv.min(MAX_PREALLOC));
        for _ in 0..nv {
            vertices.push(get_vec3(r)?);
        }
        let nf = get_count(r, "face")?;
        let mut faces = Vec::with_capacity(nf.min(MAX_PREALLOC));
        for k in 0..nf {
            let n = get_vec3(r)?;
            let d = get_f32(r)?;
            let ni = get_count(r, "id")?;
            let mut f = CovFace::new(HalfSpace::new(n, d));
            for _ in 0..ni {
                let id = get_count(r, "vertex id")?;
                if id >= nv {
                    return Err(ConvexError::format(format!(
                        "face {k} references vertex {id} of {nv}"
                    )));
                }
                f.vids.push(id);
            }
            f.rebuild_edge_half_spaces(&vertices);
            faces.push(f);
        }
        let mut cd = Self {
            flags,
            vertices,
            faces,
        };
        cd.compute_extra_half_spaces();
        Ok(cd)
    }
}
