use serde::{Deserialize, Serialize};
use super::source::SourceMesh;

/// Which mesh of a multi-mesh model grows fur
///
/// Only one mesh is ever processed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum MeshSelection {
    /// First mesh, in load order, exposing both positions and normals
    #[default]
    FirstEligible,
    /// The mesh with this name, if it is eligible
    Named { name: String },
}

impl MeshSelection {
    pub fn select<'a>(&self, meshes: &'a [SourceMesh]) -> Option<&'a SourceMesh> {
        match self {
            MeshSelection::FirstEligible => meshes.iter().find(|m| m.is_eligible()),
            MeshSelection::Named { name } => meshes
                .iter()
                .find(|m| &m.name == name)
                .filter(|m| m.is_eligible()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meshes() -> Vec<SourceMesh> {
        vec![
            SourceMesh::new("eyes", vec![0.0; 3], None, None).unwrap(),
            SourceMesh::new("body", vec![0.0; 3], Some(vec![0.0, 1.0, 0.0]), None).unwrap(),
            SourceMesh::new("tail", vec![0.0; 3], Some(vec![1.0, 0.0, 0.0]), None).unwrap(),
        ]
    }

    #[test]
    fn test_first_eligible_skips_meshes_without_normals() {
        let meshes = meshes();
        let picked = MeshSelection::FirstEligible.select(&meshes).unwrap();
        assert_eq!(picked.name, "body");
    }

    #[test]
    fn test_named_selection() {
        let meshes = meshes();
        let tail = MeshSelection::Named { name: "tail".into() }.select(&meshes);
        assert_eq!(tail.unwrap().name, "tail");

        let eyes = MeshSelection::Named { name: "eyes".into() }.select(&meshes);
        assert!(eyes.is_none());

        let missing = MeshSelection::Named { name: "mane".into() }.select(&meshes);
        assert!(missing.is_none());
    }

    #[test]
    fn test_no_meshes() {
        assert!(MeshSelection::FirstEligible.select(&[]).is_none());
    }
}
