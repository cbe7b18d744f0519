use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use rosc::{decoder, OscMessage, OscPacket, OscType};

use crate::display::SharedOptions;
use crate::framestate::{lock, SharedFrame};

/// Receives display settings over OSC.
///
/// Understood addresses:
/// - `/display/brightness <float 0..1>`
/// - `/display/enabled <bool|int|float>`
pub struct OscReceiver {
    sock: UdpSocket,
    options: SharedOptions,
    frame: SharedFrame,
}

impl OscReceiver {
    pub fn new(
        listen_addr: SocketAddr,
        options: SharedOptions,
        frame: SharedFrame,
    ) -> Result<Self, String> {
        let sock = UdpSocket::bind(listen_addr).map_err(|err| err.to_string())?;
        sock.set_read_timeout(Some(Duration::from_millis(200)))
            .map_err(|err| err.to_string())?;

        log::info!("Listening for OSC on {}", listen_addr);
        Ok(OscReceiver {
            sock,
            options,
            frame,
        })
    }

    pub fn run(&self) {
        let mut buf = [0u8; decoder::MTU];

        while !lock(&self.frame).shutdown {
            match self.sock.recv_from(&mut buf) {
                Ok((size, addr)) => {
                    log::trace!("Received packet with size {} from: {}", size, addr);
                    match decoder::decode(&buf[..size]) {
                        Ok(packet) => self.handle_packet(packet),
                        Err(err) => log::warn!("Dropping malformed OSC packet: {:?}", err),
                    }
                }
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                Err(err) => {
                    log::error!("Error receiving from socket: {}", err);
                    break;
                }
            }
        }
    }

    fn handle_packet(&self, packet: OscPacket) {
        match packet {
            OscPacket::Message(msg) => {
                if !self.handle_message(&msg) {
                    log::debug!("Ignoring OSC message {} {:?}", msg.addr, msg.args);
                }
            }
            OscPacket::Bundle(bundle) => {
                for packet in bundle.content {
                    self.handle_packet(packet);
                }
            }
        }
    }

    fn handle_message(&self, msg: &OscMessage) -> bool {
        match msg.addr.as_str() {
            "/display/brightness" => {
                match Self::float_argument(msg) {
                    Ok(value) => {
                        let percent = (value.clamp(0.0, 1.0) * 100.0).round() as u8;
                        lock(&self.options).brightness = percent;
                        log::info!("Brightness set to {}%", percent);
                    }
                    Err(err) => log::warn!("{}", err),
                }
                true
            }
            "/display/enabled" => {
                match Self::switch_argument(msg) {
                    Ok(enabled) => {
                        lock(&self.options).enabled = enabled;
                        log::info!("Display {}", if enabled { "enabled" } else { "disabled" });
                    }
                    Err(err) => log::warn!("{}", err),
                }
                true
            }
            _ => false,
        }
    }

    fn float_argument(msg: &OscMessage) -> Result<f32, String> {
        match msg.args.first() {
            Some(OscType::Float(value)) => Ok(*value),
            Some(OscType::Double(value)) => Ok(*value as f32),
            Some(arg) => Err(format!("{} Unexpected OSC parameter type: {:?}", msg.addr, arg)),
            None => Err(format!("{} Missing OSC parameter: float", msg.addr)),
        }
    }

    fn switch_argument(msg: &OscMessage) -> Result<bool, String> {
        match msg.args.first() {
            Some(OscType::Bool(value)) => Ok(*value),
            Some(OscType::Int(value)) => Ok(*value != 0),
            Some(OscType::Float(value)) => Ok(*value >= 0.5),
            Some(arg) => Err(format!("{} Unexpected OSC parameter type: {:?}", msg.addr, arg)),
            None => Err(format!("{} Missing OSC parameter: on/off", msg.addr)),
        }
    }
}
