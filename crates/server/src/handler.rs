//! Request routing.

use std::path::PathBuf;
use std::sync::Arc;

use vestlink_device::Dispatcher;
use vestlink_haptics::HapticCommand;
use vestlink_protocol::{
    Broadcast, GameId, ModInfo, Request, RequestKind, Response, SessionVerb,
};
use vestlink_session::SessionRegistry;

use crate::clients::ClientManager;

/// Handles one decoded request, returning the response for the requester.
/// Session lifecycle changes additionally broadcast to all clients.
pub async fn handle(
    registry: &SessionRegistry,
    dispatcher: &Arc<Dispatcher>,
    clients: &ClientManager,
    request: Request,
) -> Response {
    let req_id = request.req_id.clone();

    match request.kind() {
        RequestKind::Ping => Response::Ping {
            req_id,
            alive: true,
            client_count: clients.count(),
        },

        RequestKind::DeviceStatus => {
            let status = dispatcher.status();
            Response::DeviceStatus {
                req_id,
                delivered: status.delivered,
                dropped: status.dropped,
                failures: status.failures,
                last_error: status.last_error,
            }
        }

        RequestKind::Trigger => {
            let (Some(cell), Some(speed)) = (request.cell, request.speed) else {
                return Response::error("trigger requires cell and speed", req_id);
            };
            if dispatcher.dispatch(HapticCommand::pulse(vec![cell], speed)) {
                clients.broadcast(&Broadcast::effect_triggered(&[cell], speed));
                Response::ok(req_id)
            } else {
                Response::error(format!("invalid or dropped trigger for cell {cell}"), req_id)
            }
        }

        RequestKind::StopAll => {
            dispatcher.stop_all().await;
            Response::ok(req_id)
        }

        RequestKind::ModInfo(game) => Response::ModInfo {
            req_id,
            info: mod_info(game),
        },

        RequestKind::Session(game, SessionVerb::Start) => {
            let log_path = request.log_path.clone().map(PathBuf::from);
            match registry.start(game, log_path, request.message.clone()) {
                Ok(path) => {
                    clients.broadcast(&Broadcast::session_started(
                        game,
                        &path.display().to_string(),
                    ));
                    Response::ok(req_id)
                }
                Err(e) => Response::error(e.to_string(), req_id),
            }
        }

        RequestKind::Session(game, SessionVerb::Stop) => {
            // Stop is always accepted; the broadcast only fires when
            // something was actually running.
            if registry.stop(game).await {
                clients.broadcast(&Broadcast::session_stopped(game));
            }
            Response::ok(req_id)
        }

        RequestKind::Session(game, SessionVerb::Status) => Response::Status {
            req_id,
            status: registry.status(game),
        },

        RequestKind::Unknown => {
            Response::error(format!("unknown command: {}", request.cmd), req_id)
        }
    }
}

/// Static per-game mod/install metadata, served to UI clients.
fn mod_info(game: GameId) -> ModInfo {
    match game {
        GameId::Alyx => ModInfo {
            name: "Tactsuit events for Half-Life: Alyx".into(),
            description: "Lua scripts that emit game events to console.log".into(),
            download_url: Some("https://www.nexusmods.com/halflifealyx/mods/6".into()),
            install_instructions: vec![
                "Extract the Scripts archive into Steam/steamapps/common/Half-Life Alyx/".into(),
                "Add to game/hlvr/cfg/skill_manifest.cfg: script_reload_code tactsuit.lua".into(),
                "Add -condebug to the game's launch options in Steam".into(),
            ],
        },
        GameId::Hl2dm => ModInfo {
            name: "Half-Life 2: Deathmatch console logging".into(),
            description: "No mod required; the engine writes the kill feed itself".into(),
            download_url: None,
            install_instructions: vec![
                "Add -condebug to the game's launch options in Steam".into(),
                "Set a player name filter to scope effects to your own player".into(),
            ],
        },
        GameId::StarCitizen => ModInfo {
            name: "Star Citizen Game.log".into(),
            description: "No mod required; the game writes Game.log natively".into(),
            download_url: None,
            install_instructions: vec![
                "Pass your in-game handle as the player filter when starting".into(),
            ],
        },
        GameId::ForHonor => ModInfo {
            name: "For Honor combat logger".into(),
            description: "Community combat logger writing directional hit lines".into(),
            download_url: None,
            install_instructions: vec![
                "Install the community combat logger and point it at its log output".into(),
            ],
        },
    }
}
