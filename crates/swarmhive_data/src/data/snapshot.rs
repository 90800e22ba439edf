use super::entity::{Color, EntityId, EntityKind};
use serde::{Deserialize, Serialize};

/// Read-only view of one entity, handed to renderers once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub x: f64,
    pub y: f64,
    pub color: Color,
    /// Radius for round entities, edge length for obstacles.
    pub size: f64,
    pub energy: f64,
    /// Color of the food a worker is carrying, if any.
    #[serde(default)]
    pub carried_food: Option<Color>,
}

/// Colony figures shown next to the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueenStats {
    pub id: EntityId,
    pub color: Color,
    pub workers: usize,
    pub energy: f64,
}

/// Complete state of a scene at the end of a tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub tick: u64,
    pub width: f64,
    pub height: f64,
    pub background: Color,
    pub entities: Vec<EntitySnapshot>,
    pub queens: Vec<QueenStats>,
}

impl SceneSnapshot {
    /// Iterates the entities of one category.
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &EntitySnapshot> {
        self.entities.iter().filter(move |e| e.kind == kind)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_kind_filters() {
        let snap = SceneSnapshot {
            entities: vec![
                EntitySnapshot {
                    id: EntityId::new(),
                    kind: EntityKind::Food,
                    x: 1.0,
                    y: 2.0,
                    color: Color::new(0, 150, 0),
                    size: 3.0,
                    energy: 30.0,
                    carried_food: None,
                },
                EntitySnapshot {
                    id: EntityId::new(),
                    kind: EntityKind::Obstacle,
                    x: 5.0,
                    y: 5.0,
                    color: Color::OBSTACLE,
                    size: 100.0,
                    energy: 1.0,
                    carried_food: None,
                },
            ],
            ..Default::default()
        };
        assert_eq!(snap.of_kind(EntityKind::Food).count(), 1);
        assert_eq!(snap.of_kind(EntityKind::Queen).count(), 0);
        assert!(snap.to_json().unwrap().contains("\"Obstacle\""));
    }
}
