// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod common;

use common::{init_logging, renderer_with, triangle, Call, MockGraphicsContext, FSH, VSH};
use image::RgbaImage;
use vu_core::math::Mat4;
use vu_core::renderer::*;

/// Calls recorded after `mark`.
fn calls_since(mock: &MockGraphicsContext, mark: usize) -> Vec<Call> {
    mock.state.borrow().calls[mark..].to_vec()
}

fn mark(mock: &MockGraphicsContext) -> usize {
    mock.state.borrow().calls.len()
}

fn draws(calls: &[Call]) -> Vec<Call> {
    calls
        .iter()
        .filter(|c| matches!(c, Call::DrawElements(..) | Call::DrawArrays(..)))
        .cloned()
        .collect()
}

#[test]
fn old_contexts_are_rejected() {
    init_logging();
    let mock = MockGraphicsContext::new();
    mock.state.borrow_mut().version = ContextVersion {
        major: 3,
        minor: 2,
        is_embedded: false,
    };
    let err = Renderer::new(Box::new(mock.clone()), RenderSettings::default()).unwrap_err();
    assert_eq!(err, RenderError::UnsupportedVersion("OpenGL 3.2".to_string()));
    assert!(mock.state.borrow().calls.is_empty());
}

#[test]
fn new_renderer_sets_initial_state() {
    let mock = MockGraphicsContext::new();
    let _renderer = renderer_with(&mock);
    let state = mock.state.borrow();
    assert_eq!(
        state.calls,
        [
            Call::SetCapability(Capability::DepthTest, true),
            Call::SetCapability(Capability::CullFace, true),
            Call::SetCapability(Capability::Blend, true),
        ]
    );
}

#[test]
fn blending_can_be_disabled_by_settings() {
    let mock = MockGraphicsContext::new();
    let settings = RenderSettings::from_json(r#"{ "blend": false }"#).unwrap();
    let _renderer = Renderer::new(Box::new(mock.clone()), settings).unwrap();
    assert!(!mock
        .state
        .borrow()
        .calls
        .contains(&Call::SetCapability(Capability::Blend, true)));
}

#[test]
fn triangles_draw_all_indices_and_program_is_used_once() {
    let mock = MockGraphicsContext::new();
    let mut renderer = renderer_with(&mock);
    let shader = renderer.new_shader("flat", VSH, FSH).unwrap();
    let mesh = triangle(&mut renderer, "tri");
    let mut model = renderer.new_model(shader).unwrap();
    renderer.set_mesh(&mut model, mesh).unwrap();

    let start = mark(&mock);
    renderer.render(&model).unwrap();
    renderer.render(&model).unwrap();
    let calls = calls_since(&mock, start);

    assert_eq!(
        draws(&calls),
        [
            Call::DrawElements(DrawMode::Triangles, 3, 0),
            Call::DrawElements(DrawMode::Triangles, 3, 0)
        ]
    );
    assert_eq!(calls.iter().filter(|c| matches!(c, Call::UseProgram(_))).count(), 1);
    assert_eq!(calls[0], Call::SetCapability(Capability::DepthTest, true));
    assert_eq!(calls[1], Call::SetCapability(Capability::CullFace, true));
    assert_eq!(
        calls.last(),
        Some(&Call::SetCapability(Capability::DepthTest, false))
    );
}

#[test]
fn switching_programs_uses_each() {
    let mock = MockGraphicsContext::new();
    let mut renderer = renderer_with(&mock);
    let a = renderer.new_shader("a", VSH, FSH).unwrap();
    let b = renderer.new_shader("b", VSH, FSH).unwrap();
    let mesh = triangle(&mut renderer, "tri");
    let mut first = renderer.new_model(a).unwrap();
    let mut second = renderer.new_model(b).unwrap();
    renderer.set_mesh(&mut first, mesh).unwrap();
    renderer.set_mesh(&mut second, mesh).unwrap();

    let start = mark(&mock);
    renderer.render(&first).unwrap();
    renderer.render(&second).unwrap();
    renderer.render(&first).unwrap();
    let uses = calls_since(&mock, start)
        .into_iter()
        .filter(|c| matches!(c, Call::UseProgram(_)))
        .count();
    assert_eq!(uses, 3);
}

#[test]
fn lines_draw_in_wireframe() {
    let mock = MockGraphicsContext::new();
    let mut renderer = renderer_with(&mock);
    let shader = renderer.new_shader("flat", VSH, FSH).unwrap();
    let mesh = triangle(&mut renderer, "tri");
    let mut model = renderer.new_model(shader).unwrap();
    renderer.set_mesh(&mut model, mesh).unwrap();
    model.set_draw_mode(DrawMode::Lines);

    let start = mark(&mock);
    renderer.render(&model).unwrap();
    let calls = calls_since(&mock, start);
    let at = calls
        .iter()
        .position(|c| *c == Call::DrawElements(DrawMode::Lines, 3, 0))
        .expect("line draw");
    assert_eq!(calls[at - 1], Call::PolygonLines(true));
    assert_eq!(calls[at + 1], Call::PolygonLines(false));
}

#[test]
fn points_draw_every_vertex_with_program_point_size() {
    let mock = MockGraphicsContext::new();
    let mut renderer = renderer_with(&mock);
    let shader = renderer.new_shader("flat", VSH, FSH).unwrap();
    let mesh = renderer.new_mesh("cloud");
    renderer
        .mesh_mut(mesh)
        .unwrap()
        .init_data(0, 3, BufferUsage::Dynamic, false)
        .set_data(0, [0.0f32; 15]);
    let mut model = renderer.new_model(shader).unwrap();
    renderer.set_mesh(&mut model, mesh).unwrap();
    model.set_draw_mode(DrawMode::Points);

    let start = mark(&mock);
    renderer.render(&model).unwrap();
    let calls = calls_since(&mock, start);
    assert_eq!(draws(&calls), [Call::DrawArrays(DrawMode::Points, 0, 5)]);
    assert!(calls.contains(&Call::SetCapability(Capability::ProgramPointSize, true)));
}

#[test]
fn flat_models_disable_depth_and_culling() {
    let mock = MockGraphicsContext::new();
    let mut renderer = renderer_with(&mock);
    let shader = renderer.new_shader("hud", VSH, FSH).unwrap();
    let mesh = triangle(&mut renderer, "tri");
    let mut model = renderer.new_model(shader).unwrap();
    renderer.set_mesh(&mut model, mesh).unwrap();
    model.set_2d();
    model.set_cull_off();

    let start = mark(&mock);
    renderer.render(&model).unwrap();
    let calls = calls_since(&mock, start);
    assert_eq!(calls[0], Call::SetCapability(Capability::DepthTest, false));
    assert_eq!(calls[1], Call::SetCapability(Capability::CullFace, false));
}

#[test]
fn face_ranges_draw_with_their_own_texture() {
    let mock = MockGraphicsContext::new();
    let mut renderer = renderer_with(&mock);
    let shader = renderer.new_shader("textured", VSH, FSH).unwrap();
    let mesh = triangle(&mut renderer, "pair");
    renderer
        .mesh_mut(mesh)
        .unwrap()
        .set_faces(&[0, 1, 2, 2, 1, 0]);
    let skin = renderer.new_texture("skin", RgbaImage::new(2, 2));
    let eyes = renderer.new_texture("eyes", RgbaImage::new(2, 2));

    let mut model = renderer.new_model(shader).unwrap();
    renderer.set_mesh(&mut model, mesh).unwrap();
    model.add_model_texture(&mut renderer, skin, 0, 1).unwrap();
    model.add_model_texture(&mut renderer, eyes, 1, 1).unwrap();
    let skin_id = renderer.texture(skin).unwrap().texture_id().map(|t| t.0.get());
    let eyes_id = renderer.texture(eyes).unwrap().texture_id().map(|t| t.0.get());

    let start = mark(&mock);
    renderer.render(&model).unwrap();
    let calls = calls_since(&mock, start);
    let at = calls
        .iter()
        .position(|c| *c == Call::ActiveTexture(0))
        .expect("sampler unit selected");
    assert_eq!(
        calls[at + 1..at + 5],
        [
            Call::BindTexture(skin_id),
            Call::DrawElements(DrawMode::Triangles, 3, 0),
            Call::BindTexture(eyes_id),
            Call::DrawElements(DrawMode::Triangles, 3, 6),
        ]
    );
}

#[test]
fn models_without_a_valid_mesh_are_skipped() {
    let mock = MockGraphicsContext::new();
    let mut renderer = renderer_with(&mock);
    let shader = renderer.new_shader("flat", VSH, FSH).unwrap();
    let mut model = renderer.new_model(shader).unwrap();

    let start = mark(&mock);
    renderer.render(&model).unwrap();
    assert!(draws(&calls_since(&mock, start)).is_empty());

    let mesh = renderer.new_mesh("empty");
    renderer.set_mesh(&mut model, mesh).unwrap();
    renderer.render(&model).unwrap();
    assert!(draws(&calls_since(&mock, start)).is_empty());
}

#[test]
fn uniforms_resolve_builtins_then_user_values() {
    let mock = MockGraphicsContext::with_program(
        &["mvpm", "alpha", "kd", "uv", "unset", "scale"],
        &[("in_v", 0)],
    );
    let mut renderer = renderer_with(&mock);
    let shader = renderer.new_shader("lit", VSH, FSH).unwrap();
    let mesh = triangle(&mut renderer, "tri");
    let mut model = renderer.new_model(shader).unwrap();
    renderer.set_mesh(&mut model, mesh).unwrap();
    model.set_uniform("kd", &[0.2, 0.4, 0.6]);
    model.set_alpha(0.5);
    model.set_mvp_transform(&Mat4::from_translation(vu_core::math::Vec3::new(1.0, 2.0, 3.0)));

    renderer.render(&model).unwrap();
    let state = mock.state.borrow();

    let mvp = state.uniform_writes(0);
    assert_eq!(mvp.len(), 1);
    assert_eq!(&mvp[0][12..15], &[1.0, 2.0, 3.0]);
    assert_eq!(state.uniform_writes(1), [vec![0.5]]);
    assert_eq!(state.uniform_writes(2), [vec![0.2, 0.4, 0.6]]);
    // No texture is attached, so the sampler is left alone.
    assert!(state.uniform_writes(3).is_empty());
    assert!(state.uniform_writes(4).is_empty());
    assert_eq!(state.uniform_writes(5), [vec![1.0, 1.0, 1.0]]);
    // A missing user value does not stop the draw.
    assert_eq!(state.count(|c| matches!(c, Call::DrawElements(..))), 1);
}

#[test]
fn sampler_uniform_binds_its_texture_unit() {
    let mock = MockGraphicsContext::with_program(&["uv0", "uv1"], &[]);
    let mut renderer = renderer_with(&mock);
    let shader = renderer.new_shader("detail", VSH, FSH).unwrap();
    let mesh = triangle(&mut renderer, "tri");
    let base = renderer.new_texture("base", RgbaImage::new(4, 4));
    let detail = renderer.new_texture("detail", RgbaImage::new(4, 4));
    let mut model = renderer.new_model(shader).unwrap();
    renderer.set_mesh(&mut model, mesh).unwrap();
    model.add_texture(&mut renderer, base).unwrap();
    model.add_texture(&mut renderer, detail).unwrap();
    let detail_id = renderer.texture(detail).unwrap().texture_id().map(|t| t.0.get());

    let start = mark(&mock);
    renderer.render(&model).unwrap();
    let calls = calls_since(&mock, start);
    let at = calls
        .iter()
        .position(|c| *c == Call::SetUniform(1, vec![1.0]))
        .expect("unit 1 sampler set");
    assert_eq!(calls[at + 1], Call::ActiveTexture(1));
    assert_eq!(calls[at + 2], Call::BindTexture(detail_id));
}

#[test]
fn pose_uniform_uploads_every_joint() {
    let mock = MockGraphicsContext::with_program(&["bpos[0]"], &[]);
    mock.state.borrow_mut().uniforms[0].1 = 2;
    let mut renderer = renderer_with(&mock);
    let shader = renderer.new_shader("skinned", VSH, FSH).unwrap();
    let mesh = triangle(&mut renderer, "tri");
    let walk = renderer.new_animation(
        "walk",
        vec![Mat4::IDENTITY; 4],
        vec![-1, 0],
        vec![Movement::new("idle", 0, 2)],
    );
    let mut model = renderer.new_model(shader).unwrap();
    renderer.set_mesh(&mut model, mesh).unwrap();

    renderer.render(&model).unwrap();
    assert!(mock.state.borrow().uniform_writes(0).is_empty());

    model.set_animation(&renderer, walk).unwrap();
    renderer.render(&model).unwrap();
    let writes = mock.state.borrow().uniform_writes(0);
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].len(), 24);
    assert_eq!(writes[0][0], 1.0);
}

#[test]
fn frame_helpers_reach_the_context() {
    let mock = MockGraphicsContext::new();
    let mut renderer = renderer_with(&mock);
    renderer.clear();
    renderer.viewport(640, 480);
    renderer.set_clear_color([0.1, 0.2, 0.3, 1.0]);
    renderer.enable(Capability::Blend, false);

    assert_eq!(renderer.settings().clear_color, [0.1, 0.2, 0.3, 1.0]);
    let state = mock.state.borrow();
    assert!(state.calls.contains(&Call::Clear));
    assert!(state.calls.contains(&Call::Viewport(640, 480)));
    assert!(state
        .calls
        .contains(&Call::SetCapability(Capability::Blend, false)));
}
