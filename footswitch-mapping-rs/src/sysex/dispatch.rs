use crate::hal::{ConfigFlash, MidiTransport};
use crate::mapping::{Configuration, EventSlot, SwitchEvent, MAX_MESSAGES_PER_SLOT};
use crate::storage::ConfigStore;

use super::error::ProtocolError;
use super::reader::{open_frame, FrameReader};
use super::response::Response;
use super::{Command, STATUS_ERROR, STATUS_OK};

/// Decode one captured frame, act on it and answer on `transport`.
///
/// Returns the command that was handled. On `Err` no state was changed;
/// malformed frames and bad read requests get no answer, while a rejected
/// `SetMessages` is answered with [`STATUS_ERROR`] before the error is
/// returned.
///
/// A `SetMessages` whose persist step fails still returns `Ok`: the new slot
/// stays live in `config`, and the host is told it is not durable through the
/// error status.
pub fn dispatch<F, T>(
    frame: &[u8],
    config: &mut Configuration,
    store: &mut ConfigStore<F>,
    transport: &mut T,
) -> Result<Command, ProtocolError>
where
    F: ConfigFlash,
    T: MidiTransport,
{
    let (command, mut reader) = open_frame(frame)?;

    match command {
        Command::GetInfo => {
            reader.finish()?;
            send(transport, &Response::info(config.switch_count()));
        }

        Command::GetMessages => {
            let (switch, event) = read_target(&mut reader, config)?;
            reader.finish()?;
            // Index was checked against the switch count above.
            let slot = config
                .slot(switch, event)
                .map_err(|_| ProtocolError::FieldOutOfRange)?;
            send(transport, &Response::messages(switch, event, slot));
        }

        Command::GetAllMessages => {
            reader.finish()?;
            for (switch, event, slot) in config.slots() {
                send(transport, &Response::messages(switch, event, slot));
            }
        }

        Command::SetMessages => {
            let (switch, event, slot) = match read_set_request(&mut reader, config) {
                Ok(request) => request,
                Err(e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("SetMessages rejected: {}", e);

                    send(transport, &Response::set_result(STATUS_ERROR));
                    return Err(e);
                }
            };

            let status = apply_set(config, store, switch, event, slot);
            send(transport, &Response::set_result(status));
        }
    }

    #[cfg(feature = "defmt")]
    defmt::debug!("Handled {}", command);

    Ok(command)
}

/// Read and range-check a `(switch, event)` pair.
fn read_target(
    reader: &mut FrameReader<'_>,
    config: &Configuration,
) -> Result<(usize, SwitchEvent), ProtocolError> {
    let switch = reader.read_below(config.switch_count())? as usize;
    let event = SwitchEvent::try_from(reader.read_u8()?)
        .map_err(|_| ProtocolError::FieldOutOfRange)?;
    Ok((switch, event))
}

/// Fully decode a `SetMessages` payload without touching `config`.
fn read_set_request(
    reader: &mut FrameReader<'_>,
    config: &Configuration,
) -> Result<(usize, SwitchEvent, EventSlot), ProtocolError> {
    let (switch, event) = read_target(reader, config)?;
    let count = reader.read_at_most(MAX_MESSAGES_PER_SLOT)?;

    let mut slot = EventSlot::new();
    for _ in 0..count {
        let message = reader.read_message()?;
        slot.push(message).map_err(|_| ProtocolError::FieldOutOfRange)?;
    }
    reader.finish()?;

    Ok((switch, event, slot))
}

/// Install a validated slot and persist the table. Returns the status byte.
fn apply_set<F: ConfigFlash>(
    config: &mut Configuration,
    store: &mut ConfigStore<F>,
    switch: usize,
    event: SwitchEvent,
    slot: EventSlot,
) -> u8 {
    if config.set_slot(switch, event, slot).is_err() {
        return STATUS_ERROR;
    }

    match store.persist(config) {
        Ok(()) => STATUS_OK,
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::error!("Persist failed; mapping change is not durable");
            STATUS_ERROR
        }
    }
}

fn send<T: MidiTransport>(transport: &mut T, response: &Response) {
    let bytes = response.as_bytes();
    let _written = transport.write(bytes);

    #[cfg(feature = "defmt")]
    if _written < bytes.len() {
        defmt::warn!("Response dropped: {} of {} bytes queued", _written, bytes.len());
    }
}
