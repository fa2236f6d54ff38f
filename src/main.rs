//! Viewer binary: window shell, input handling and the frame loop

use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};

use rosegold::{map_key, InputCommand, Renderer, RendererConfig, Window};

fn apply_command(renderer: &mut Renderer, command: InputCommand, elwt: &EventLoopWindowTarget<()>) {
    match command {
        InputCommand::Accelerate(delta) => renderer.camera_mut().accelerate(delta),
        InputCommand::StopAccelerating => renderer.camera_mut().stop_accelerating(),
        InputCommand::Turn(delta) => renderer.camera_mut().turn(delta),
        InputCommand::Nudge(delta) => renderer.camera_mut().nudge(delta),
        InputCommand::ResetAccumulation => renderer.reset_accumulation(),
        InputCommand::SaveImage => match renderer.save_image() {
            Ok(path) => log::info!("Saved accumulated image to {}", path.display()),
            Err(err) => log::error!("Image export failed: {err}"),
        },
        InputCommand::Exit => elwt.exit(),
    }
}

fn main() {
    env_logger::init();

    let config = RendererConfig::default();
    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let mut window = Window::new(&event_loop, &config.title, config.width, config.height);

    let mut renderer = match Renderer::new(window.window_arc(), &config) {
        Ok(renderer) => renderer,
        Err(err) => {
            log::error!("Renderer cannot be initialized: {err}");
            return;
        }
    };

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => {
                    window.handle_event(&event);

                    if window.should_close() {
                        elwt.exit();
                        return;
                    }
                    if let WindowEvent::KeyboardInput { event: key, .. } = &event {
                        if let Some(command) = map_key(key) {
                            apply_command(&mut renderer, command, elwt);
                        }
                    }
                    if window.was_resized() {
                        let (width, height) = window.dimensions();
                        renderer.resize(width, height);
                        window.clear_resize_flag();
                    }
                }
                Event::AboutToWait => {
                    if let Err(err) = renderer.draw() {
                        log::error!("Frame failed: {err}");
                        elwt.exit();
                        return;
                    }
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .expect("Event loop failed");
}
