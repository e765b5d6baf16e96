//! `GameContext`: the shared handle spawn code goes through.
//!
//! Bundles the resources needed to put a fish on screen so producers (the spawn flow,
//! the debug spawner, tests) don't each repeat the pool/path/registry dance.

use avian2d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::common::error::ArcadeError;
use crate::common::pool::Acquired;
use crate::common::rng::ArcadeRng;
use crate::common::tunables::Tunables;
use crate::plugins::fish::behavior::{DeathStyle, MovementDriver};
use crate::plugins::fish::catalog::FishCatalog;
use crate::plugins::fish::effects::EffectSequence;
use crate::plugins::fish::lifecycle::FishLife;
use crate::plugins::fish::spawn::FishSpawn;
use crate::plugins::fish::systems::{inactive_fish_layers, FishPresentation};
use crate::plugins::fish::{
    ActiveFish, FishData, FishKind, FishPools, FishRegistry, Hitbox, PooledFish, TargetRef,
};
use crate::plugins::paths::{PathLibrary, SpawnBatchContext};

#[derive(SystemParam)]
pub struct GameContext<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub registry: ResMut<'w, FishRegistry>,
    pub pools: ResMut<'w, FishPools>,
    pub catalog: Res<'w, FishCatalog>,
    pub paths: ResMut<'w, PathLibrary>,
    pub tunables: Res<'w, Tunables>,
    pub rng: ResMut<'w, ArcadeRng>,
}

impl GameContext<'_, '_> {
    /// A fresh batch context: direction and optional path set rolled once per batch.
    pub fn begin_batch(&mut self) -> SpawnBatchContext {
        SpawnBatchContext::roll(&self.paths, self.tunables.fish.path_set_chance, &mut self.rng.0)
    }

    /// Acquire a pooled fish for `request`, reset it for a new lifetime and register it.
    ///
    /// Reused and new entities get the same component writes, so no state from a
    /// previous lifetime survives.
    pub fn spawn_fish(
        &mut self,
        request: &FishSpawn,
        batch: &mut SpawnBatchContext,
    ) -> Result<TargetRef, ArcadeError> {
        let template = match self.catalog.template(&request.variant) {
            Some(t) => t.clone(),
            None => {
                warn!(variant = %request.variant, "unknown fish variant");
                return Err(ArcadeError::UnknownVariant(request.variant.clone()));
            }
        };
        // The server type picks the pool and death style; the variant only picks visuals.
        let fish_type = request.fish_type.unwrap_or(template.fish_type);
        let death_style = if fish_type == template.fish_type {
            template.death_style
        } else {
            DeathStyle::for_fish(template.effect, fish_type)
        };
        let lifespan_ms = request.lifespan_ms.unwrap_or(self.tunables.fish.default_lifespan_ms);

        let path_id = self.paths.pick_path(fish_type, batch, &mut self.rng.0)?;
        let (start, path_length) = match self.paths.path(path_id) {
            Some(p) => (p.start(), p.length()),
            None => {
                return Err(ArcadeError::NoPathAvailable {
                    fish_type,
                    right_to_left: batch.move_right_to_left,
                });
            }
        };

        let serial = self.registry.next_serial();
        let commands = &mut self.commands;
        let acquired = self.pools.pool_mut(fish_type).acquire_or_create(|| {
            commands
                .spawn((
                    Name::new(format!("Fish({fish_type:?})")),
                    PooledFish,
                    FishKind(fish_type),
                    RigidBody::Kinematic,
                    Sensor,
                    CollisionEventsEnabled,
                    inactive_fish_layers(),
                    Sprite::default(),
                    Transform::default(),
                    Visibility::Hidden,
                ))
                .id()
        });
        if let Acquired::Created(e) = acquired {
            debug!(entity = ?e, ?fish_type, "fish pool grew");
        }
        let entity = acquired.item();
        let target = TargetRef { entity, serial };

        let hold = death_style.hold_secs(&self.tunables.fish);
        let mut entity_cmds = self.commands.entity(entity);
        entity_cmds.insert((
            FishData {
                fish_id: request.fish_id.clone(),
                variant: template.variant.clone(),
                fish_type,
                lifespan_ms,
                multiplier: request.multiplier,
            },
            FishLife::spawned(serial, lifespan_ms, hold, &self.tunables.fish),
            MovementDriver::new(path_id, path_length, lifespan_ms, template.speed_profile),
            death_style,
            FishPresentation::new(template.color),
            Hitbox { size: template.collider_size, offset: template.collider_offset },
            Collider::rectangle(template.collider_size.x, template.collider_size.y),
            Sprite {
                color: template.color.with_alpha(0.0),
                custom_size: Some(template.sprite_size),
                ..default()
            },
            Transform::from_translation(start.extend(1.0)),
            Visibility::Visible,
        ));
        match template.effect {
            Some(kind) => {
                entity_cmds.insert(EffectSequence::new(kind));
            }
            None => {
                entity_cmds.remove::<EffectSequence>();
            }
        }

        self.registry.register(ActiveFish {
            target,
            fish_id: request.fish_id.clone(),
            variant: template.variant,
            fish_type,
        });
        debug!(?target, variant = %request.variant, path = ?path_id, "fish spawned");
        Ok(target)
    }
}
