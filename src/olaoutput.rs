use std::net::{SocketAddr, UdpSocket};

use rosc::{encoder, OscMessage, OscPacket, OscType};

use crate::brightness::{unpack, PackedColor};
use crate::display::FrameSink;

const UNIVERSE_SIZE: usize = 512;
const PIXELS_PER_UNIVERSE: usize = UNIVERSE_SIZE / 3;

/// Sends frames to OLA's OSC plugin, three DMX channels per pixel.
///
/// Frames larger than one universe continue in the following universes.
pub struct OlaOutput {
    sock: UdpSocket,
    target_addr: SocketAddr,
    first_universe: u32,
    buffers: Vec<Vec<u8>>,
}

impl OlaOutput {
    pub fn new(
        target_addr: SocketAddr,
        first_universe: u32,
        pixel_count: usize,
    ) -> Result<Self, String> {
        let our_addr = if target_addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let sock = UdpSocket::bind(our_addr).map_err(|err| err.to_string())?;

        let universe_count = pixel_count.div_ceil(PIXELS_PER_UNIVERSE).max(1);
        log::info!(
            "Sending {} pixels to OLA at {} (universes {}..={})",
            pixel_count,
            target_addr,
            first_universe,
            first_universe + universe_count as u32 - 1
        );

        Ok(OlaOutput {
            sock,
            target_addr,
            first_universe,
            buffers: vec![vec![0; UNIVERSE_SIZE]; universe_count],
        })
    }

    fn set_pixel(&mut self, index: usize, color: PackedColor) {
        let rgb = unpack(color);
        let buffer = &mut self.buffers[index / PIXELS_PER_UNIVERSE];
        let channel = (index % PIXELS_PER_UNIVERSE) * 3;
        buffer[channel..channel + 3].copy_from_slice(&[rgb.red, rgb.green, rgb.blue]);
    }

    fn encode_universe(universe: u32, buffer: &[u8]) -> Result<Vec<u8>, String> {
        encoder::encode(&OscPacket::Message(OscMessage {
            addr: format!("/dmx/universe/{}", universe),
            args: vec![OscType::Blob(buffer.to_vec())],
        }))
        .map_err(|err| format!("{:?}", err))
    }
}

impl FrameSink for OlaOutput {
    fn name(&self) -> &'static str {
        "OLA"
    }

    fn show(&mut self, pixels: &[PackedColor]) -> Result<(), String> {
        let capacity = self.buffers.len() * PIXELS_PER_UNIVERSE;
        if pixels.len() > capacity {
            return Err(format!(
                "frame of {} pixels exceeds {} configured pixels",
                pixels.len(),
                capacity
            ));
        }

        for (index, color) in pixels.iter().enumerate() {
            self.set_pixel(index, *color);
        }

        for (offset, buffer) in self.buffers.iter().enumerate() {
            let msg_buf = Self::encode_universe(self.first_universe + offset as u32, buffer)?;
            self.sock
                .send_to(&msg_buf, self.target_addr)
                .map_err(|err| err.to_string())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rosc::decoder;

    use super::*;

    fn receiver() -> UdpSocket {
        let sock = UdpSocket::bind("127.0.0.1:0").unwrap();
        sock.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        sock
    }

    fn recv_universe(sock: &UdpSocket) -> (String, Vec<u8>) {
        let mut buf = [0u8; decoder::MTU];
        let size = sock.recv(&mut buf).unwrap();
        match decoder::decode(&buf[..size]).unwrap() {
            OscPacket::Message(msg) => match msg.args.as_slice() {
                [OscType::Blob(data)] => (msg.addr, data.clone()),
                other => panic!("unexpected arguments {:?}", other),
            },
            OscPacket::Bundle(bundle) => panic!("unexpected bundle {:?}", bundle),
        }
    }

    #[test]
    fn sends_rgb_channels() {
        let target = receiver();
        let mut ola = OlaOutput::new(target.local_addr().unwrap(), 0, 64).unwrap();

        let mut pixels = vec![0; 64];
        pixels[0] = 0x00FF00;
        pixels[63] = 0x123456;
        ola.show(&pixels).unwrap();

        let (addr, data) = recv_universe(&target);
        assert_eq!(addr, "/dmx/universe/0");
        assert_eq!(data.len(), UNIVERSE_SIZE);
        assert_eq!(&data[0..3], &[0x00, 0xFF, 0x00]);
        assert_eq!(&data[189..192], &[0x12, 0x34, 0x56]);
        assert!(data[192..].iter().all(|v| *v == 0));
    }

    #[test]
    fn large_boards_span_universes() {
        let target = receiver();
        let mut ola = OlaOutput::new(target.local_addr().unwrap(), 3, 256).unwrap();

        let mut pixels = vec![0; 256];
        pixels[PIXELS_PER_UNIVERSE] = 0x0000FF;
        ola.show(&pixels).unwrap();

        let (first, _) = recv_universe(&target);
        let (second, data) = recv_universe(&target);
        assert_eq!(first, "/dmx/universe/3");
        assert_eq!(second, "/dmx/universe/4");
        assert_eq!(&data[0..3], &[0x00, 0x00, 0xFF]);
    }

    #[test]
    fn rejects_oversized_frames() {
        let target = receiver();
        let mut ola = OlaOutput::new(target.local_addr().unwrap(), 0, 64).unwrap();
        assert!(ola.show(&vec![0; 400]).is_err());
    }
}
