//! egui control panel. Reads and edits the `SceneController` each frame.

use crate::camera::PITCH_LIMIT;
use crate::mesh::{MeshStats, ShapeKind};
use crate::scene::{SceneController, ranges};
use crate::texture::TextureKind;
use glam::Vec3;

#[derive(Debug, Default)]
pub struct ViewerPanel;

impl ViewerPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn show(&mut self, ctx: &egui::Context, scene: &mut SceneController, stats: MeshStats) {
        egui::Window::new("Primitive Viewer")
            .default_pos([10.0, 10.0])
            .resizable(false)
            .show(ctx, |ui| {
                self.scene_section(ui, scene, stats);
                ui.separator();
                self.shape_section(ui, scene);
                ui.separator();
                self.transform_section(ui, scene);
            });
    }

    fn scene_section(&mut self, ui: &mut egui::Ui, scene: &mut SceneController, stats: MeshStats) {
        let mut clear_color = scene.clear_color();
        ui.horizontal(|ui| {
            ui.label("clear color");
            if ui
                .color_edit_button_rgba_unmultiplied(&mut clear_color)
                .changed()
            {
                scene.set_clear_color(clear_color);
            }
        });

        let camera = &mut scene.camera;
        ui.horizontal(|ui| {
            ui.label("camera position");
            ui.add(egui::DragValue::new(&mut camera.position.x).speed(0.05));
            ui.add(egui::DragValue::new(&mut camera.position.y).speed(0.05));
            ui.add(egui::DragValue::new(&mut camera.position.z).speed(0.05));
        });
        ui.add(
            egui::DragValue::new(&mut camera.yaw)
                .speed(1.0)
                .clamp_range(0.0..=360.0)
                .prefix("yaw "),
        );
        let mut pitch = camera.pitch;
        if ui
            .add(
                egui::DragValue::new(&mut pitch)
                    .speed(1.0)
                    .clamp_range(-PITCH_LIMIT..=PITCH_LIMIT)
                    .prefix("pitch "),
            )
            .changed()
        {
            camera.set_pitch(pitch);
        }
        if ui.button("reset camera").clicked() {
            scene.reset_camera();
        }

        ui.label(format!("#vertices: {}", stats.vertices));
        ui.label(format!("#triangles: {}", stats.triangles));
    }

    fn shape_section(&mut self, ui: &mut egui::Ui, scene: &mut SceneController) {
        let mut shape = scene.shape();
        egui::ComboBox::from_label("Primitive")
            .selected_text(shape.label())
            .show_ui(ui, |ui| {
                for kind in ShapeKind::ALL {
                    ui.selectable_value(&mut shape, kind, kind.label());
                }
            });
        scene.select_shape(shape);

        let mut texture = scene.texture();
        egui::ComboBox::from_label("Texture")
            .selected_text(texture.label())
            .show_ui(ui, |ui| {
                for kind in TextureKind::ALL {
                    ui.selectable_value(&mut texture, kind, kind.label());
                }
            });
        scene.select_texture(texture);

        match scene.shape() {
            ShapeKind::Cube => {}
            ShapeKind::Cylinder => {
                let mut params = scene.cylinder();
                let mut changed = false;
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.segments, ranges::CYLINDER_SEGMENTS)
                            .text("segments"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.upper_radius, ranges::CYLINDER_RADIUS)
                            .text("upper radius"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.lower_radius, ranges::CYLINDER_RADIUS)
                            .text("lower radius"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.height, ranges::CYLINDER_HEIGHT)
                            .text("height"),
                    )
                    .changed();
                if changed {
                    scene.set_cylinder(params);
                }
            }
            ShapeKind::Sphere => {
                let mut params = scene.sphere();
                let mut changed = false;
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.latitude_segments, ranges::SPHERE_SEGMENTS)
                            .text("latitude segments"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.longitude_segments, ranges::SPHERE_SEGMENTS)
                            .text("longitude segments"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.radius, ranges::SPHERE_RADIUS)
                            .text("radius"),
                    )
                    .changed();
                if changed {
                    scene.set_sphere(params);
                }
            }
            ShapeKind::Torus => {
                let mut params = scene.torus();
                let mut changed = false;
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.tube_segments, ranges::TORUS_SEGMENTS)
                            .text("tube segments"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.ring_segments, ranges::TORUS_SEGMENTS)
                            .text("ring segments"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.outer_radius, ranges::TORUS_OUTER_RADIUS)
                            .text("outer radius"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.inner_radius, ranges::TORUS_INNER_RADIUS)
                            .text("inner radius"),
                    )
                    .changed();
                if changed {
                    scene.set_torus(params);
                }
            }
        }
    }

    fn transform_section(&mut self, ui: &mut egui::Ui, scene: &mut SceneController) {
        let transform = &mut scene.transform;
        ui.horizontal(|ui| {
            ui.label("rotation");
            ui.add(egui::DragValue::new(&mut transform.rotation.x).speed(1.0).suffix("°"));
            ui.add(egui::DragValue::new(&mut transform.rotation.y).speed(1.0).suffix("°"));
            ui.add(egui::DragValue::new(&mut transform.rotation.z).speed(1.0).suffix("°"));
        });

        let mut scale = transform.scale;
        let mut scale_changed = false;
        ui.horizontal(|ui| {
            ui.label("scale");
            for axis in [&mut scale.x, &mut scale.y, &mut scale.z] {
                scale_changed |= ui
                    .add(
                        egui::DragValue::new(axis)
                            .speed(0.01)
                            .clamp_range(ranges::MODEL_SCALE),
                    )
                    .changed();
            }
        });

        ui.checkbox(&mut transform.animate, "animation");
        ui.horizontal(|ui| {
            ui.label("rotation speed");
            ui.add(egui::DragValue::new(&mut transform.rotation_speed.x).speed(1.0));
            ui.add(egui::DragValue::new(&mut transform.rotation_speed.y).speed(1.0));
            ui.add(egui::DragValue::new(&mut transform.rotation_speed.z).speed(1.0));
        });

        if ui.button("reset transform").clicked() {
            transform.reset();
        } else if scale_changed {
            scene.set_model_scale(Vec3::new(scale.x, scale.y, scale.z));
        }
    }
}
