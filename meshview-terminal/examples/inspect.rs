/// Example: Load an OBJ file, apply a few transforms and print the result
///
/// Usage: cargo run --example inspect -- path/to/model.obj

use std::env;
use std::io::{self, Write};

use meshview_core::{Axis, Event, Notification, TransformEngine};
use meshview_terminal::{AsciiRenderer, Viewport};

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <obj-file>", args[0]);
        std::process::exit(2);
    }

    let mut engine = TransformEngine::new();
    engine.subscribe(|notification| match notification {
        Notification::ModelLoaded { vertices, faces } => {
            println!("loaded {} vertices, {} faces", vertices.len(), faces.len());
        }
        Notification::ModelUpdated { vertices } => {
            if let Some(first) = vertices.first() {
                println!("updated, first vertex now {:.3} {:.3} {:.3}", first.x, first.y, first.z);
            }
        }
        Notification::LoadFailed { error, path } => {
            eprintln!("failed to load {}: {}", path.display(), error);
        }
    });

    if engine.load_model(&args[1]).is_err() {
        std::process::exit(1);
    }

    let Some(bounds) = engine.mesh().map(|mesh| mesh.bounds()) else {
        return Ok(());
    };
    let viewport = Viewport::fit(&bounds, 60, 24);

    engine.handle_batch([
        Event::Rotate { value: 30.0, axis: Axis::X },
        Event::Rotate { value: 45.0, axis: Axis::Y },
    ]);
    engine.on_scale_changed(0.8);

    if let Some(mesh) = engine.mesh() {
        let mut renderer = AsciiRenderer::new(60, 24);
        renderer.render_wireframe(mesh.vertices(), mesh.faces(), &viewport);

        let mut stdout = io::stdout();
        for row in renderer.rows() {
            writeln!(stdout, "{row}")?;
        }
    }

    Ok(())
}
