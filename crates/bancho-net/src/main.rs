// main.rs — binary entrypoint
//
// Grounded on the teacher's `myq2-sys/src/main.rs`: parse arguments,
// initialize subsystems, accept and run forever. The teacher drives a
// winit event loop over a single rendered client; this entrypoint drives
// one accept loop per configured port, each accepted stream handed to its
// own thread (spec §9 "one thread per connection, a worker pool behind
// the dispatcher" rather than an event-loop-driven single process).

use std::sync::Arc;

use clap::Parser;

use bancho_common::config::{Cli, ServerConfig};
use bancho_server::dispatcher;
use bancho_server::external::memory::in_memory_collaborators;
use bancho_server::ServerState;

mod io_thread;
mod listener;
mod ping;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = match ServerConfig::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            log::error!("failed to load {:?}: {err}", cli.config);
            std::process::exit(1);
        }
    };

    let state = Arc::new(ServerState::new(config, in_memory_collaborators()));
    let dispatcher = Arc::new(dispatcher::build());

    let ping_state = state.clone();
    let mut handles = vec![std::thread::spawn(move || ping::run(ping_state))];
    let mut bound_ports = 0;
    for &port in &state.config.ports {
        let listener = match listener::bind(port) {
            Ok(l) => l,
            Err(err) => {
                log::error!("failed to bind port {port}: {err}");
                continue;
            }
        };
        log::info!("listening on :{port}");
        bound_ports += 1;

        let state = state.clone();
        let dispatcher = dispatcher.clone();
        handles.push(std::thread::spawn(move || {
            for incoming in listener.incoming() {
                match incoming {
                    Ok(stream) => {
                        let state = state.clone();
                        let dispatcher = dispatcher.clone();
                        std::thread::spawn(move || {
                            io_thread::handle_connection(stream, state, dispatcher);
                        });
                    }
                    Err(err) => log::warn!("accept failed on :{port}: {err}"),
                }
            }
        }));
    }

    if bound_ports == 0 {
        log::error!("no listener ports bound, exiting");
        std::process::exit(1);
    }

    for handle in handles {
        let _ = handle.join();
    }
}
