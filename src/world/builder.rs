// ──────────────────────────────────────────────────────────────────────────
// world/builder.rs
//
//  *   vertices / sectors / lines        ──╮
//  *   clockwise face rings (subspaces)    │   --->  world::geometry::Map
//  *   materials                           │          + half-edge mesh
//                                          ╯
// ──────────────────────────────────────────────────────────────────────────

use std::collections::HashMap;

use glam::{DVec2, Vec2, Vec3};
use thiserror::Error;

use crate::world::{
    geometry::{
        Line, LineFlags, LineId, LineOwner, LineSide, Map, Plane, PlaneId, Sector, SectorId,
        SideFlags, SideSections, Subsector, SubsectorId, Surface, Vertex, VertexId, BACK, FRONT,
    },
    helpers::direction_angle,
    material::{Material, MaterialBank, MaterialError, MaterialId},
    mesh::{Face, HEdge, HEdgeId, LineSideSegment, Mesh},
};

/// Collinearity tolerance when attributing half-edges to lines.
const ON_LINE_EPSILON: f64 = 1.0e-6;

/*──────────────────────────── Error type ───────────────────────────*/

#[derive(Error, Debug, PartialEq)]
pub enum BuildError {
    #[error(transparent)]
    Material(#[from] MaterialError),

    #[error("vertex {0} out of range")]
    BadVertex(VertexId),

    #[error("sector {0} out of range")]
    BadSector(SectorId),

    #[error("subsector {0} out of range")]
    BadSubsector(SubsectorId),

    #[error("line {0} has zero length")]
    ZeroLengthLine(LineId),

    #[error("face {0} has fewer than three vertices")]
    DegenerateFace(usize),

    #[error("edge {0} -> {1} is used by more than one face")]
    DuplicateEdge(VertexId, VertexId),
}

/*──────────────────────────── Side input ───────────────────────────*/

/// Builder-side description of one line side (a "sidedef").
#[derive(Clone, Debug)]
pub struct SideDef {
    pub sector: SectorId,
    pub middle: Option<MaterialId>,
    pub bottom: Option<MaterialId>,
    pub top: Option<MaterialId>,
    /// Material origin applied to all three sections.
    pub offset: Vec2,
    pub flags: SideFlags,
    /// `false` produces a side with a sector but nothing to draw.
    pub renderable: bool,
}

impl SideDef {
    pub fn new(sector: SectorId) -> Self {
        SideDef {
            sector,
            middle: None,
            bottom: None,
            top: None,
            offset: Vec2::ZERO,
            flags: SideFlags::empty(),
            renderable: true,
        }
    }

    pub fn middle(mut self, mat: MaterialId) -> Self {
        self.middle = Some(mat);
        self
    }

    pub fn bottom(mut self, mat: MaterialId) -> Self {
        self.bottom = Some(mat);
        self
    }

    pub fn top(mut self, mat: MaterialId) -> Self {
        self.top = Some(mat);
        self
    }

    pub fn offset(mut self, x: f32, y: f32) -> Self {
        self.offset = Vec2::new(x, y);
        self
    }

    pub fn flags(mut self, flags: SideFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn bare(sector: SectorId) -> Self {
        SideDef {
            renderable: false,
            ..SideDef::new(sector)
        }
    }

    pub fn into_side(self) -> LineSide {
        let surface = |material| Surface {
            material,
            material_origin: self.offset,
            normal: Vec3::ZERO,
        };
        LineSide {
            sector: Some(self.sector),
            sections: self.renderable.then(|| SideSections {
                middle: surface(self.middle),
                bottom: surface(self.bottom),
                top: surface(self.top),
            }),
            flags: self.flags,
        }
    }
}

/*====================================================================*/
/*                       Builder                                      */
/*====================================================================*/

/// Assembles a [`Map`] and its half-edge mesh.
///
/// Faces are given as **clockwise** vertex rings. Twins are linked by
/// matching reversed vertex pairs; half-edges collinear with a line are
/// attributed to the side of that line they run along.
#[derive(Default)]
pub struct MapBuilder {
    name: String,
    vertices: Vec<Vertex>,
    lines: Vec<Line>,
    sectors: Vec<Sector>,
    planes: Vec<Plane>,
    subsectors: Vec<Subsector>,
    faces: Vec<(Option<SubsectorId>, Vec<VertexId>)>,
    materials: MaterialBank,
}

impl MapBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        MapBuilder {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn material(&mut self, mat: Material) -> Result<MaterialId, BuildError> {
        Ok(self.materials.insert(mat)?)
    }

    pub fn vertex(&mut self, x: f64, y: f64) -> VertexId {
        self.vertices.push(Vertex {
            pos: DVec2::new(x, y),
        });
        (self.vertices.len() - 1) as VertexId
    }

    /// New sector with a floor and a ceiling plane.
    pub fn sector(&mut self, floor: f64, ceiling: f64) -> SectorId {
        let id = self.sectors.len() as SectorId;
        self.sectors.push(Sector { planes: Vec::new() });
        self.add_plane(id, floor, Vec3::Z);
        self.add_plane(id, ceiling, Vec3::NEG_Z);
        id
    }

    /// Add a plane beyond the sector's floor and ceiling.
    pub fn extra_plane(&mut self, sector: SectorId, height: f64) -> PlaneId {
        self.add_plane(sector, height, Vec3::Z)
    }

    fn add_plane(&mut self, sector: SectorId, height: f64, normal: Vec3) -> PlaneId {
        let id = self.planes.len() as PlaneId;
        let planes = &mut self.sectors[sector as usize].planes;
        self.planes.push(Plane {
            sector,
            index_in_sector: planes.len(),
            height,
            surface: Surface {
                normal,
                ..Surface::EMPTY
            },
        });
        planes.push(id);
        id
    }

    pub fn floor_of(&self, sector: SectorId) -> PlaneId {
        self.sectors[sector as usize].floor()
    }

    pub fn ceiling_of(&self, sector: SectorId) -> PlaneId {
        self.sectors[sector as usize].ceiling()
    }

    pub fn plane_mut(&mut self, plane: PlaneId) -> &mut Plane {
        &mut self.planes[plane as usize]
    }

    /// Subsector whose visual planes are the sector's own.
    pub fn subsector(&mut self, sector: SectorId) -> SubsectorId {
        let s = &self.sectors[sector as usize];
        self.subsectors.push(Subsector {
            sector,
            vis_floor: s.floor(),
            vis_ceiling: s.ceiling(),
        });
        (self.subsectors.len() - 1) as SubsectorId
    }

    pub fn subsector_mut(&mut self, ss: SubsectorId) -> &mut Subsector {
        &mut self.subsectors[ss as usize]
    }

    /// Add a line; a back side makes it two-sided.
    pub fn line(
        &mut self,
        from: VertexId,
        to: VertexId,
        front: SideDef,
        back: Option<SideDef>,
    ) -> LineId {
        let mut flags = LineFlags::empty();
        if back.is_some() {
            flags |= LineFlags::TWO_SIDED;
        }
        self.lines.push(Line {
            from,
            to,
            flags,
            sides: [front.into_side(), back.map(SideDef::into_side).unwrap_or_default()],
            polyobj: None,
        });
        (self.lines.len() - 1) as LineId
    }

    /// Add a line belonging to a polyobj hosted by subsector `host`.
    pub fn polyobj_line(
        &mut self,
        from: VertexId,
        to: VertexId,
        front: SideDef,
        back: Option<SideDef>,
        host: SubsectorId,
    ) -> LineId {
        let id = self.line(from, to, front, back);
        self.lines[id as usize].polyobj = Some(host);
        id
    }

    pub fn line_flags(&mut self, line: LineId, flags: LineFlags) {
        self.lines[line as usize].flags |= flags;
    }

    pub fn line_side_mut(&mut self, line: LineId, side: usize) -> &mut LineSide {
        &mut self.lines[line as usize].sides[side]
    }

    /// Add a convex subspace given as a clockwise vertex ring.
    pub fn face(&mut self, subsector: Option<SubsectorId>, ring: &[VertexId]) -> usize {
        self.faces.push((subsector, ring.to_vec()));
        self.faces.len() - 1
    }

    // ---------------------------------------------------------------------
    // Assembly
    // ---------------------------------------------------------------------

    pub fn build(mut self) -> Result<Map, BuildError> {
        self.validate()?;
        self.assign_side_normals();

        let mut mesh = Mesh::default();
        let mut by_edge: HashMap<(VertexId, VertexId), HEdgeId> = HashMap::new();

        /*----- 1. Face rings --------------------------------------------*/
        for (face_idx, (subsector, ring)) in self.faces.iter().enumerate() {
            let base = mesh.hedges.len() as HEdgeId;
            let k = ring.len() as HEdgeId;
            for (i, &v) in ring.iter().enumerate() {
                let i = i as HEdgeId;
                let to = ring[((i + 1) % k) as usize];
                if by_edge.insert((v, to), base + i).is_some() {
                    return Err(BuildError::DuplicateEdge(v, to));
                }
                mesh.hedges.push(HEdge {
                    origin: v,
                    twin: None,
                    next: base + (i + 1) % k,
                    prev: base + (i + k - 1) % k,
                    face: Some(face_idx as u32),
                    segment: None,
                });
            }
            mesh.faces.push(Face {
                hedge: base,
                subsector: *subsector,
            });
        }

        /*----- 2. Twins --------------------------------------------------*/
        for (&(a, b), &id) in &by_edge {
            if let Some(&twin) = by_edge.get(&(b, a)) {
                mesh.hedges[id as usize].twin = Some(twin);
            }
        }

        /*----- 3. Polyobj lines: free-standing half-edge pairs ------------*/
        for (line_id, line) in self.lines.iter().enumerate() {
            if !line.defines_polyobj() {
                continue;
            }
            let front = mesh.hedges.len() as HEdgeId;
            let back = front + 1;
            let length = (self.pos(line.to) - self.pos(line.from)).length();
            for (id, origin, twin, side) in [(front, line.from, back, FRONT), (back, line.to, front, BACK)] {
                mesh.hedges.push(HEdge {
                    origin,
                    twin: Some(twin),
                    next: id,
                    prev: id,
                    face: None,
                    segment: Some(LineSideSegment {
                        line: line_id as LineId,
                        side,
                        line_side_offset: 0.0,
                        length,
                    }),
                });
            }
        }

        /*----- 4. Attribute face half-edges to line sides -----------------*/
        for (&(a, b), &id) in &by_edge {
            mesh.hedges[id as usize].segment = self.segment_for(a, b);
        }

        /*----- 5. Vertex owner rings --------------------------------------*/
        let mut vertex_owners: Vec<Vec<LineOwner>> = vec![Vec::new(); self.vertices.len()];
        for (line_id, line) in self.lines.iter().enumerate() {
            let d = self.pos(line.to) - self.pos(line.from);
            vertex_owners[line.from as usize].push(LineOwner {
                line: line_id as LineId,
                angle: direction_angle(d),
            });
            vertex_owners[line.to as usize].push(LineOwner {
                line: line_id as LineId,
                angle: direction_angle(-d),
            });
        }
        for ring in &mut vertex_owners {
            ring.sort_by(|a, b| a.angle.total_cmp(&b.angle));
        }

        log::debug!(
            "built map {}: {} lines, {} faces, {} half-edges",
            self.name,
            self.lines.len(),
            mesh.faces.len(),
            mesh.hedges.len()
        );

        Ok(Map {
            name: self.name,
            vertices: self.vertices,
            lines: self.lines,
            sectors: self.sectors,
            planes: self.planes,
            subsectors: self.subsectors,
            mesh,
            materials: self.materials,
            vertex_owners,
        })
    }

    fn pos(&self, v: VertexId) -> DVec2 {
        self.vertices[v as usize].pos
    }

    fn validate(&self) -> Result<(), BuildError> {
        let nv = self.vertices.len() as VertexId;
        let check_vertex = |v: VertexId| if v < nv { Ok(()) } else { Err(BuildError::BadVertex(v)) };

        for (id, line) in self.lines.iter().enumerate() {
            check_vertex(line.from)?;
            check_vertex(line.to)?;
            if self.pos(line.from) == self.pos(line.to) {
                return Err(BuildError::ZeroLengthLine(id as LineId));
            }
            for side in &line.sides {
                if let Some(s) = side.sector {
                    if s as usize >= self.sectors.len() {
                        return Err(BuildError::BadSector(s));
                    }
                }
            }
            if let Some(host) = line.polyobj {
                if host as usize >= self.subsectors.len() {
                    return Err(BuildError::BadSubsector(host));
                }
            }
        }
        for (idx, (subsector, ring)) in self.faces.iter().enumerate() {
            if ring.len() < 3 {
                return Err(BuildError::DegenerateFace(idx));
            }
            for &v in ring {
                check_vertex(v)?;
            }
            if let Some(ss) = *subsector {
                if ss as usize >= self.subsectors.len() {
                    return Err(BuildError::BadSubsector(ss));
                }
            }
        }
        Ok(())
    }

    /// Front sides face right of `from → to`, back sides the opposite way.
    fn assign_side_normals(&mut self) {
        for i in 0..self.lines.len() {
            let line = &self.lines[i];
            let d = (self.pos(line.to) - self.pos(line.from)).normalize_or_zero();
            let right = Vec3::new(d.y as f32, -d.x as f32, 0.0);
            let line = &mut self.lines[i];
            for (side, normal) in [(FRONT, right), (BACK, -right)] {
                if let Some(sections) = line.sides[side].sections.as_mut() {
                    sections.middle.normal = normal;
                    sections.bottom.normal = normal;
                    sections.top.normal = normal;
                }
            }
        }
    }

    /// Which line side (if any) the half-edge `a → b` runs along.
    fn segment_for(&self, a: VertexId, b: VertexId) -> Option<LineSideSegment> {
        let (pa, pb) = (self.pos(a), self.pos(b));
        for (line_id, line) in self.lines.iter().enumerate() {
            if line.defines_polyobj() {
                continue;
            }
            let (from, to) = (self.pos(line.from), self.pos(line.to));
            let d = to - from;
            let len = d.length();
            let on_line = |p: DVec2| {
                let t = (p - from).dot(d) / (len * len);
                d.perp_dot(p - from).abs() <= ON_LINE_EPSILON * len
                    && (-ON_LINE_EPSILON..=1.0 + ON_LINE_EPSILON).contains(&t)
            };
            if !on_line(pa) || !on_line(pb) {
                continue;
            }
            let side = if (pb - pa).dot(d) > 0.0 { FRONT } else { BACK };
            let start = if side == FRONT { from } else { to };
            return Some(LineSideSegment {
                line: line_id as LineId,
                side,
                line_side_offset: (pa - start).length(),
                length: (pb - pa).length(),
            });
        }
        None
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
