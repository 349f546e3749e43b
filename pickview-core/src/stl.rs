//! STL import for binary and ASCII files.
//!
//! Facets become triangular faces. Identical vertex positions are welded so
//! neighbouring facets share vertices and edges.
use std::collections::{HashMap, HashSet};

use nalgebra::Point3;
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::opt,
    multi::many0,
    number::complete::float,
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::StlError;
use crate::geometry::Model;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

type Facet = [[f32; 3]; 3];

/// Collects facets into a welded [`Model`].
#[derive(Default)]
struct ModelBuilder {
    model: Model,
    welded: HashMap<[u32; 3], usize>,
    edges: HashSet<(usize, usize)>,
}

impl ModelBuilder {
    fn vertex(&mut self, p: [f32; 3]) -> usize {
        let key = p.map(f32::to_bits);
        *self.welded.entry(key).or_insert_with(|| {
            self.model
                .add_vertex(Point3::new(p[0] as f64, p[1] as f64, p[2] as f64))
        })
    }

    fn facet(&mut self, facet: &Facet) -> Result<(), StlError> {
        let indices = facet.map(|p| self.vertex(p));
        self.model.add_face(&indices)?;
        for k in 0..3 {
            let (a, b) = (indices[k], indices[(k + 1) % 3]);
            if self.edges.insert((a.min(b), a.max(b))) {
                self.model.add_edge(a, b)?;
            }
        }
        Ok(())
    }

    fn finish(self) -> Model {
        self.model
    }
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Model, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooShort(data.len()));
    }
    let count_bytes = [data[80], data[81], data[82], data[83]];
    let facet_count = u32::from_le_bytes(count_bytes) as usize;
    let body = &data[HEADER_LEN + 4..];

    let mut builder = ModelBuilder::default();
    for index in 0..facet_count {
        let record = body
            .get(index * FACET_LEN..(index + 1) * FACET_LEN)
            .ok_or(StlError::UnexpectedEof(index))?;
        // 12 bytes of normal, then three vertices, then 2 attribute bytes
        let mut facet = [[0.0f32; 3]; 3];
        for (v, vertex) in facet.iter_mut().enumerate() {
            for (c, coord) in vertex.iter_mut().enumerate() {
                let at = 12 + v * 12 + c * 4;
                *coord = f32::from_le_bytes([record[at], record[at + 1], record[at + 2], record[at + 3]]);
            }
        }
        builder.facet(&facet)?;
    }
    Ok(builder.finish())
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Model, StlError> {
    let (_, facets) = parse_solid(input).map_err(|e| StlError::Ascii(e.to_string()))?;
    let mut builder = ModelBuilder::default();
    for facet in &facets {
        builder.facet(facet)?;
    }
    Ok(builder.finish())
}

fn parse_solid(input: &str) -> IResult<&str, Vec<Facet>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = not_line_ending(input)?;
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = opt(not_line_ending)(input)?;
    Ok((input, facets))
}

fn parse_facet(input: &str) -> IResult<&str, Facet> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, (v1, v2, v3)) = tuple((parse_vertex, parse_vertex, parse_vertex))(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;
    Ok((input, [v1, v2, v3]))
}

fn parse_vertex(input: &str) -> IResult<&str, [f32; 3]> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    parse_vector3(input)
}

fn parse_vector3(input: &str) -> IResult<&str, [f32; 3]> {
    let (input, x) = preceded(multispace1, float)(input)?;
    let (input, y) = preceded(multispace1, float)(input)?;
    let (input, z) = preceded(multispace1, float)(input)?;
    Ok((input, [x, y, z]))
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Model, StlError> {
    // Binary files may also start with "solid", so fall back on failure
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(model) = parse_ascii_stl(text) {
                return Ok(model);
            }
        }
    }
    parse_binary_stl(data)
}
