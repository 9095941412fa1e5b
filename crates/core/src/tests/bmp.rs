use core::time::Duration;

use crate::{
    bmp::{BitsPerPixel, BmpDecoder, Header, HEADER_LEN},
    display::{Rgb565, Window},
    playback::{Decoder, Pause, Unit},
    test_utils::{bmp_file, bmp_header, MemoryFile, RecordingSink},
    Error, DISPLAY_HEIGHT, DISPLAY_WIDTH,
};

const FRAME_PIXELS: usize = DISPLAY_WIDTH as usize * DISPLAY_HEIGHT as usize;

fn gradient(frame: u8, row: u8, column: u8) -> [u8; 3] {
    [column.wrapping_mul(2), row.wrapping_mul(3), frame.wrapping_mul(50)]
}

/// Colours a frame is expected to be sent with.
fn expected_frame(frame: u8) -> Vec<Rgb565> {
    let mut colors = Vec::with_capacity(FRAME_PIXELS);
    for row in (0..DISPLAY_HEIGHT).rev() {
        for column in (0..DISPLAY_WIDTH).rev() {
            let [r, g, b] = gradient(frame, row, column);
            colors.push(Rgb565::from_rgb(r, g, b));
        }
    }
    colors
}

fn set_u32(header: &mut [u8; HEADER_LEN], offset: usize, value: u32) {
    header[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[test]
fn test_header_accepts_frame_stack() {
    let header = Header::parse(&bmp_header(98, 140, 24)).unwrap();
    assert_eq!(
        header,
        Header {
            bits_per_pixel: BitsPerPixel::Bgr24,
            frames: 2,
            data_offset: 54,
        }
    );

    let header = Header::parse(&bmp_header(98, 70, 32)).unwrap();
    assert_eq!(header.bits_per_pixel, BitsPerPixel::Bgra32);
    assert_eq!(header.frames, 1);
}

#[test]
fn test_header_rejects_geometry() {
    assert_eq!(
        Header::parse(&bmp_header(97, 70, 24)),
        Err(Error::WidthMismatch)
    );
    assert_eq!(
        Header::parse(&bmp_header(98, 75, 24)),
        Err(Error::StackHeightMismatch)
    );
    assert_eq!(
        Header::parse(&bmp_header(98, -70, 24)),
        Err(Error::StackHeightMismatch)
    );
    assert_eq!(
        Header::parse(&bmp_header(98, 0, 24)),
        Err(Error::StackHeightMismatch)
    );
    assert_eq!(
        Header::parse(&bmp_header(98, 70, 16)),
        Err(Error::UnsupportedBitDepth)
    );
}

#[test]
fn test_header_rejects_encoding() {
    let mut header = bmp_header(98, 70, 24);
    header[0] = b'P';
    assert_eq!(Header::parse(&header), Err(Error::UnsupportedFormat));

    let mut header = bmp_header(98, 70, 24);
    header[0x1A] = 2;
    assert_eq!(Header::parse(&header), Err(Error::PlanesMismatch));

    let mut header = bmp_header(98, 70, 24);
    set_u32(&mut header, 0x1E, 1);
    assert_eq!(Header::parse(&header), Err(Error::Compressed));

    let mut header = bmp_header(98, 70, 24);
    set_u32(&mut header, 0x2E, 16);
    assert_eq!(Header::parse(&header), Err(Error::Palette));
}

#[test]
fn test_header_encoding_checked_before_geometry() {
    let mut header = bmp_header(97, 75, 16);
    set_u32(&mut header, 0x1E, 3);
    assert_eq!(Header::parse(&header), Err(Error::Compressed));
}

#[test]
fn test_row_padding() {
    assert_eq!(BitsPerPixel::Bgr24.row_len(), 296);
    assert_eq!(BitsPerPixel::Bgra32.row_len(), 392);
}

#[test]
fn test_single_frame_waits_forever() {
    super::init_logger();

    let file = MemoryFile::new(bmp_file(1, 24, gradient));
    let mut decoder = BmpDecoder::open(file, Duration::from_millis(100)).unwrap();
    let mut sink = RecordingSink::new();

    decoder.restart(&mut sink).unwrap();
    assert_eq!(sink.windows(), vec![Window::FULL_SCREEN]);
    sink.clear();

    assert_eq!(
        decoder.next_unit(&mut sink).unwrap(),
        Unit::Frame(Pause::Forever)
    );
    assert_eq!(sink.colors(), expected_frame(0));
    // One transaction per scanline.
    assert_eq!(sink.transactions(), usize::from(DISPLAY_HEIGHT));
    assert_eq!(decoder.next_unit(&mut sink).unwrap(), Unit::End);
}

#[test]
fn test_first_pixel_is_bottom_right() {
    let file = MemoryFile::new(bmp_file(1, 24, |_, row, column| {
        if row == DISPLAY_HEIGHT - 1 && column == DISPLAY_WIDTH - 1 {
            [0xFF, 0x00, 0x00]
        } else {
            [0x00, 0x00, 0x00]
        }
    }));
    let mut decoder = BmpDecoder::open(file, Duration::from_millis(100)).unwrap();
    let mut sink = RecordingSink::new();
    decoder.restart(&mut sink).unwrap();
    decoder.next_unit(&mut sink).unwrap();

    let colors = sink.colors();
    assert_eq!(colors[0], Rgb565(0xF800));
    assert!(colors[1..].iter().all(|color| *color == Rgb565::BLACK));
}

#[test]
fn test_pixel_depths_render_identically() {
    let render = |bits_per_pixel| {
        let file = MemoryFile::new(bmp_file(1, bits_per_pixel, gradient));
        let mut decoder = BmpDecoder::open(file, Duration::from_millis(100)).unwrap();
        let mut sink = RecordingSink::new();
        decoder.restart(&mut sink).unwrap();
        decoder.next_unit(&mut sink).unwrap();
        sink.colors()
    };

    assert_eq!(render(24), render(32));
}

#[test]
fn test_frames_follow_file_order() {
    let delay = Duration::from_millis(250);
    let file = MemoryFile::new(bmp_file(3, 32, gradient));
    let mut decoder = BmpDecoder::open(file, delay).unwrap();
    let mut sink = RecordingSink::new();
    decoder.restart(&mut sink).unwrap();

    for frame in 0..3 {
        sink.clear();
        assert_eq!(
            decoder.next_unit(&mut sink).unwrap(),
            Unit::Frame(Pause::For(delay))
        );
        assert_eq!(sink.colors(), expected_frame(frame));
        assert_eq!(decoder.frame(), u32::from(frame) + 1);
    }
    assert_eq!(decoder.next_unit(&mut sink).unwrap(), Unit::End);

    // Restart rewinds to the first frame.
    decoder.restart(&mut sink).unwrap();
    sink.clear();
    decoder.next_unit(&mut sink).unwrap();
    assert_eq!(sink.colors(), expected_frame(0));
}

#[test]
fn test_data_offset_is_honored() {
    let mut bytes = bmp_file(1, 24, gradient);
    bytes[0x0A..0x0E].copy_from_slice(&60_u32.to_le_bytes());
    // Six bytes of a colour table gap.
    bytes.splice(HEADER_LEN..HEADER_LEN, [0xEE; 6]);

    let mut decoder = BmpDecoder::open(MemoryFile::new(bytes), Duration::ZERO).unwrap();
    assert_eq!(decoder.header().data_offset, 60);

    let mut sink = RecordingSink::new();
    decoder.restart(&mut sink).unwrap();
    decoder.next_unit(&mut sink).unwrap();
    assert_eq!(sink.colors(), expected_frame(0));
}

#[test]
fn test_truncated_scanline() {
    let mut bytes = bmp_file(1, 24, gradient);
    bytes.truncate(bytes.len() - 10);

    let mut decoder = BmpDecoder::open(MemoryFile::new(bytes), Duration::ZERO).unwrap();
    let mut sink = RecordingSink::new();
    decoder.restart(&mut sink).unwrap();
    assert_eq!(decoder.next_unit(&mut sink), Err(Error::UnexpectedEof));
}
