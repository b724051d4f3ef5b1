//! Flattens the live entity tree into the per-frame instance buffer.
//!
//! Runs after the update pass. Walks the tree in pre-order (parents draw
//! under their children at equal depth), skipping inactive or invisible
//! subtrees, and emits one instance per visible thing: a sprite is one
//! instance, text is one per glyph, an emitter one per particle, a tilemap
//! one per tile. Only `Ready` components are drawn.

use glam::Vec2;

use crate::api::types::EntityId;
use crate::components::entity::Entity;
use crate::components::sprite::BlendMode;
use crate::components::text::FontConfig;
use crate::components::{Component, ReadyState};
use crate::core::world::World;
use crate::renderer::instance::{RenderBuffer, RenderInstance};

/// Rebuild `buffer` from the current world state.
pub fn build_render_buffer(world: &World, buffer: &mut RenderBuffer) {
    buffer.clear();
    let mut additive = Vec::new();
    walk(world, world.root(), buffer, &mut additive);

    buffer.set_blend_split(buffer.instance_count());
    for instance in additive {
        buffer.push(instance);
    }
}

fn walk(world: &World, id: EntityId, buffer: &mut RenderBuffer, additive: &mut Vec<RenderInstance>) {
    let Some(entity) = world.get(id) else {
        return;
    };
    if !entity.active || !entity.visible {
        return;
    }

    for component in entity.components().renderables() {
        if component.state() != ReadyState::Ready {
            continue;
        }
        emit(entity, component, buffer, additive);
    }

    for &child in entity.children() {
        walk(world, child, buffer, additive);
    }
}

fn emit(
    entity: &Entity,
    component: &Component,
    buffer: &mut RenderBuffer,
    additive: &mut Vec<RenderInstance>,
) {
    match component {
        Component::Sprite(sprite) => {
            let instance = RenderInstance {
                x: entity.pos.x,
                y: entity.pos.y,
                depth: entity.pos.z,
                rotation: entity.rotation,
                scale_x: entity.scale.x,
                scale_y: entity.scale.y,
                atlas: sprite.atlas.0 as f32,
                col: sprite.col,
                row: sprite.row,
                cell_span: sprite.cell_span,
                alpha: sprite.alpha,
                blend: 0.0,
            };
            match sprite.blend {
                BlendMode::Alpha => buffer.push(instance),
                BlendMode::Additive => additive.push(RenderInstance {
                    blend: 1.0,
                    ..instance
                }),
            }
        }
        Component::Text(text) => {
            emit_glyphs(
                entity,
                &text.content,
                &text.font,
                text.char_size,
                Vec2::ZERO,
                text.alpha,
                buffer,
            );
        }
        Component::FlyText(fly) => {
            emit_glyphs(
                entity,
                &fly.content,
                &fly.font,
                fly.char_size,
                fly.offset,
                fly.alpha(),
                buffer,
            );
        }
        Component::ParticleEmitter(emitter) => {
            for particle in emitter.particles() {
                additive.push(RenderInstance {
                    x: entity.pos.x + particle.offset.x,
                    y: entity.pos.y + particle.offset.y,
                    depth: entity.pos.z,
                    rotation: 0.0,
                    scale_x: particle.size,
                    scale_y: particle.size,
                    atlas: emitter.atlas.0 as f32,
                    col: emitter.col,
                    row: emitter.row,
                    cell_span: 1.0,
                    alpha: particle.alpha(),
                    blend: 1.0,
                });
            }
        }
        Component::Tilemap(tilemap) => {
            for (x, y, tile) in tilemap.iter_tiles() {
                let local = tilemap.tile_to_local(x, y);
                buffer.push(RenderInstance {
                    x: entity.pos.x + local.x,
                    y: entity.pos.y + local.y,
                    depth: entity.pos.z,
                    rotation: tile.rotation,
                    scale_x: tilemap.tile_size,
                    scale_y: tilemap.tile_size,
                    atlas: tilemap.atlas.0 as f32,
                    col: tile.col,
                    row: tile.row,
                    cell_span: 1.0,
                    alpha: 1.0,
                    blend: 0.0,
                });
            }
        }
        // Custom renderables carry game data the host interprets itself.
        _ => {}
    }
}

fn emit_glyphs(
    entity: &Entity,
    content: &str,
    font: &FontConfig,
    char_size: f32,
    offset: Vec2,
    alpha: f32,
    buffer: &mut RenderBuffer,
) {
    let advance = char_size * font.spacing;
    let mut x = entity.pos.x + offset.x;
    let y = entity.pos.y + offset.y;

    for c in content.chars() {
        if let Some((col, row)) = font.glyph(c) {
            buffer.push(RenderInstance {
                x,
                y,
                depth: entity.pos.z,
                rotation: 0.0,
                scale_x: char_size,
                scale_y: char_size,
                atlas: font.atlas.0 as f32,
                col,
                row,
                cell_span: 1.0,
                alpha,
                blend: 0.0,
            });
        }
        x += advance;
    }
}
