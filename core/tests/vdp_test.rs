use markiii_core::core::Component;
use markiii_core::device::SmsVdp;
use markiii_core::device::sms_vdp::{CYCLES_PER_LINE, FRAME_HEIGHT, FRAME_WIDTH};

fn frame_buffer() -> Vec<u8> {
    vec![0; FRAME_WIDTH * FRAME_HEIGHT * 3]
}

/// Set up the address register through the control port.
fn set_address(vdp: &mut SmsVdp, addr: u16, code: u8) {
    vdp.write_control(addr as u8);
    vdp.write_control(((addr >> 8) as u8 & 0x3F) | (code << 6));
}

fn write_register(vdp: &mut SmsVdp, reg: u8, val: u8) {
    vdp.write_control(val);
    vdp.write_control(0x80 | reg);
}

// ============================================================
// Control protocol
// ============================================================

#[test]
fn test_vram_write_and_buffered_read() {
    let mut vdp = SmsVdp::new();

    set_address(&mut vdp, 0x1000, 1);
    vdp.write_data(0xAB);
    vdp.write_data(0xCD);
    assert_eq!(vdp.vram()[0x1000], 0xAB);
    assert_eq!(vdp.vram()[0x1001], 0xCD, "address auto-increments");

    // Code-0 setup primes the buffer, so the first read is already VRAM[A]
    set_address(&mut vdp, 0x1000, 0);
    assert_eq!(vdp.read_data(), 0xAB);
    assert_eq!(vdp.read_data(), 0xCD);
}

#[test]
fn test_address_wraps_14_bits() {
    let mut vdp = SmsVdp::new();

    set_address(&mut vdp, 0x3FFF, 1);
    vdp.write_data(0x11);
    assert_eq!(vdp.address(), 0x0000, "14-bit wrap");
    vdp.write_data(0x22);
    assert_eq!(vdp.vram()[0x3FFF], 0x11);
    assert_eq!(vdp.vram()[0x0000], 0x22);
}

#[test]
fn test_cram_write_masks_to_32() {
    let mut vdp = SmsVdp::new();

    set_address(&mut vdp, 0x0021, 3); // CRAM index 0x21 & 0x1F = 1
    vdp.write_data(0x3F);
    assert_eq!(vdp.cram()[1], 0x3F);
}

#[test]
fn test_register_write() {
    let mut vdp = SmsVdp::new();

    write_register(&mut vdp, 1, 0x60);
    assert_eq!(vdp.register(1), 0x60);
}

#[test]
fn test_status_read_resets_write_toggle() {
    let mut vdp = SmsVdp::new();

    vdp.write_control(0x34); // first half of a control write
    vdp.read_status(); // cancels it
    set_address(&mut vdp, 0x1200, 1);
    assert_eq!(vdp.address(), 0x1200, "fresh control write decodes cleanly");
}

#[test]
fn test_m3_forced_off_when_m4_set() {
    let mut vdp = SmsVdp::new();

    write_register(&mut vdp, 0, 0x06); // M4 | M3 requested together
    assert_eq!(vdp.register(0) & 0x04, 0x04, "M4 stays");
    assert_eq!(vdp.register(0) & 0x02, 0x00, "M3 forced off");
}

// ============================================================
// Counters and interrupts
// ============================================================

#[test]
fn test_vblank_flag_and_irq() {
    let mut vdp = SmsVdp::new();
    write_register(&mut vdp, 1, 0x60); // display + VBlank IRQ enable

    vdp.advance(CYCLES_PER_LINE * 192 - 1);
    assert!(!vdp.irq_pending(), "one cycle before VBlank");

    vdp.advance(1);
    assert!(vdp.irq_pending(), "VBlank raises the line");
    assert_eq!(vdp.scanline(), 192);

    let status = vdp.read_status();
    assert_ne!(status & 0x80, 0, "VBlank bit was set");
    assert!(!vdp.irq_pending(), "status read clears the line");
    assert_eq!(vdp.read_status() & 0x80, 0, "second read sees it cleared");
}

#[test]
fn test_vblank_flag_without_enable_bit() {
    let mut vdp = SmsVdp::new();

    vdp.advance(CYCLES_PER_LINE * 200);
    assert!(!vdp.irq_pending(), "flag set but IRQ not enabled");
    assert_ne!(vdp.read_status() & 0x80, 0);
}

#[test]
fn test_line_counter_irq() {
    let mut vdp = SmsVdp::new();
    write_register(&mut vdp, 0, 0x14); // M4 + line IRQ enable
    write_register(&mut vdp, 10, 4); // fire every 5 visible lines

    // The counter picks up R10 during the blanking lines of the first
    // frame, decrements again on line 0, and underflows four lines later.
    vdp.advance(CYCLES_PER_LINE * 262);
    vdp.advance(CYCLES_PER_LINE * 3);
    assert!(!vdp.irq_pending(), "counter still draining");
    vdp.advance(CYCLES_PER_LINE);
    assert!(vdp.irq_pending(), "line counter underflowed");

    vdp.read_status();
    assert!(!vdp.irq_pending(), "status read acknowledges the line IRQ");
}

#[test]
fn test_frame_wraps() {
    let mut vdp = SmsVdp::new();

    vdp.advance(CYCLES_PER_LINE * 262);
    assert_eq!(vdp.scanline(), 0);
    assert_eq!(vdp.frame_count(), 1);
}

// ============================================================
// H/V counters
// ============================================================

#[test]
fn test_hcounter_windows() {
    let mut vdp = SmsVdp::new();

    assert_eq!(vdp.h_counter(), 0x00, "cycle 0 reads 0x00");

    vdp.advance(CYCLES_PER_LINE - 2);
    assert_eq!(vdp.h_counter(), 0xB0, "end-of-line plateau reads 0xB0");
}

#[test]
fn test_hcounter_midline_ramp() {
    let mut vdp = SmsVdp::new();

    vdp.advance(114); // halfway through the line
    let h = vdp.h_counter();
    assert_eq!(h, 0x80, "midline is halfway up the ramp");
}

#[test]
fn test_vcounter_jump() {
    let mut vdp = SmsVdp::new();

    vdp.advance(CYCLES_PER_LINE * 100);
    assert_eq!(vdp.v_counter(), 100);

    let mut vdp = SmsVdp::new();
    vdp.advance(CYCLES_PER_LINE * 218);
    assert_eq!(vdp.v_counter(), 0xDA, "line 218 is the last raw value");

    vdp.advance(CYCLES_PER_LINE);
    assert_eq!(vdp.v_counter(), 213, "line 219 jumps back to 0xD5");

    let mut vdp = SmsVdp::new();
    vdp.advance(CYCLES_PER_LINE * 261);
    assert_eq!(vdp.v_counter(), 255, "last line reads 0xFF");
}

// ============================================================
// Rendering
// ============================================================

#[test]
fn test_display_disabled_shows_overscan() {
    let mut vdp = SmsVdp::new();

    // Backdrop uses the sprite half of CRAM: entry 0x10 | (R7 & 0x0F)
    write_register(&mut vdp, 7, 0x00);
    set_address(&mut vdp, 0x0010, 3);
    vdp.write_data(0x30); // BBGGRR: blue = 3

    let mut buffer = frame_buffer();
    vdp.render_frame(&mut buffer);

    for pixel in buffer.chunks_exact(3) {
        assert_eq!(pixel, &[0, 0, 255], "all pixels show the backdrop blue");
    }
}

#[test]
fn test_background_tile_rendering() {
    let mut vdp = SmsVdp::new();
    write_register(&mut vdp, 1, 0x40); // display on
    write_register(&mut vdp, 2, 0xFF); // name table at 0x3800

    // Tile 1: solid color 5 (bitplanes 0 and 2 set)
    set_address(&mut vdp, 0x0020, 1);
    for _ in 0..8 {
        vdp.write_data(0xFF);
        vdp.write_data(0x00);
        vdp.write_data(0xFF);
        vdp.write_data(0x00);
    }
    // Name entry (0,0): tile 1, background palette
    set_address(&mut vdp, 0x3800, 1);
    vdp.write_data(0x01);
    vdp.write_data(0x00);

    // Palette entry 5 = green
    set_address(&mut vdp, 0x0005, 3);
    vdp.write_data(0x0C);

    let mut buffer = frame_buffer();
    vdp.render_frame(&mut buffer);
    assert_eq!(&buffer[0..3], &[0, 255, 0], "tile pixel uses CRAM entry 5");
}

#[test]
fn test_sprite_rendering_and_palette() {
    let mut vdp = SmsVdp::new();
    write_register(&mut vdp, 1, 0x40); // display on, 8x8 sprites
    write_register(&mut vdp, 5, 0x7F); // SAT at 0x3F00
    write_register(&mut vdp, 6, 0x00); // sprite patterns at 0x0000

    // Sprite tile 1: color 1 everywhere
    set_address(&mut vdp, 0x0020, 1);
    for _ in 0..8 {
        vdp.write_data(0xFF);
        vdp.write_data(0x00);
        vdp.write_data(0x00);
        vdp.write_data(0x00);
    }

    // Sprite 0 at (0, line 10): Y byte is top-1
    set_address(&mut vdp, 0x3F00, 1);
    vdp.write_data(9);
    set_address(&mut vdp, 0x3F80, 1);
    vdp.write_data(0); // X
    vdp.write_data(1); // tile

    // Sprite palette entry 17 = red
    set_address(&mut vdp, 0x0011, 3);
    vdp.write_data(0x03);

    let mut buffer = frame_buffer();
    vdp.render_frame(&mut buffer);
    let row = 10 * FRAME_WIDTH * 3;
    assert_eq!(&buffer[row..row + 3], &[255, 0, 0], "sprite pixel uses CRAM 16..31");
    let row9 = 9 * FRAME_WIDTH * 3;
    assert_eq!(&buffer[row9..row9 + 3], &[0, 0, 0], "line above the sprite is empty");
}

#[test]
fn test_sprite_collision_flag() {
    let mut vdp = SmsVdp::new();
    write_register(&mut vdp, 1, 0x40);
    write_register(&mut vdp, 5, 0x7F);

    // One solid tile for both sprites
    set_address(&mut vdp, 0x0020, 1);
    for _ in 0..8 {
        vdp.write_data(0xFF);
        vdp.write_data(0x00);
        vdp.write_data(0x00);
        vdp.write_data(0x00);
    }

    // Two overlapping sprites at the same position
    set_address(&mut vdp, 0x3F00, 1);
    vdp.write_data(9);
    vdp.write_data(9);
    set_address(&mut vdp, 0x3F80, 1);
    vdp.write_data(10);
    vdp.write_data(1);
    vdp.write_data(10);
    vdp.write_data(1);

    // Collision is evaluated as the raster passes the line
    vdp.advance(CYCLES_PER_LINE * 20);
    assert_ne!(vdp.read_status() & 0x20, 0, "overlapping sprites collide");
}

#[test]
fn test_sprite_overflow_flag() {
    let mut vdp = SmsVdp::new();
    write_register(&mut vdp, 1, 0x40);
    write_register(&mut vdp, 5, 0x7F);

    // Nine sprites stacked on the same lines
    set_address(&mut vdp, 0x3F00, 1);
    for _ in 0..9 {
        vdp.write_data(9);
    }
    set_address(&mut vdp, 0x3F80, 1);
    for i in 0..9 {
        vdp.write_data(i * 16);
        vdp.write_data(1);
    }

    vdp.advance(CYCLES_PER_LINE * 20);
    assert_ne!(vdp.read_status() & 0x40, 0, "ninth sprite sets overflow");
}

#[test]
fn test_sprite_terminator() {
    let mut vdp = SmsVdp::new();
    write_register(&mut vdp, 1, 0x40);
    write_register(&mut vdp, 5, 0x7F);

    set_address(&mut vdp, 0x0020, 1);
    for _ in 0..8 {
        vdp.write_data(0xFF);
        vdp.write_data(0x00);
        vdp.write_data(0x00);
        vdp.write_data(0x00);
    }

    // Terminator before the second sprite
    set_address(&mut vdp, 0x3F00, 1);
    vdp.write_data(9);
    vdp.write_data(0xD0);
    vdp.write_data(9);
    set_address(&mut vdp, 0x3F80, 1);
    vdp.write_data(0);
    vdp.write_data(1);
    vdp.write_data(40);
    vdp.write_data(1);
    vdp.write_data(80);
    vdp.write_data(1);

    set_address(&mut vdp, 0x0011, 3);
    vdp.write_data(0x03);

    let mut buffer = frame_buffer();
    vdp.render_frame(&mut buffer);
    let row = 10 * FRAME_WIDTH * 3;
    assert_eq!(&buffer[row..row + 3], &[255, 0, 0], "first sprite drawn");
    let beyond = row + 80 * 3;
    assert_eq!(
        &buffer[beyond..beyond + 3],
        &[0, 0, 0],
        "0xD0 terminates the sprite list"
    );
}

#[test]
fn test_vertical_scroll() {
    let mut vdp = SmsVdp::new();
    write_register(&mut vdp, 1, 0x40);
    write_register(&mut vdp, 2, 0xFF);
    write_register(&mut vdp, 9, 8); // scroll down one tile row

    // Tile 1 solid color 1; name entry at row 1, column 0
    set_address(&mut vdp, 0x0020, 1);
    for _ in 0..8 {
        vdp.write_data(0xFF);
        vdp.write_data(0x00);
        vdp.write_data(0x00);
        vdp.write_data(0x00);
    }
    set_address(&mut vdp, 0x3800 + 64, 1);
    vdp.write_data(0x01);
    vdp.write_data(0x00);

    set_address(&mut vdp, 0x0001, 3);
    vdp.write_data(0x03); // red

    let mut buffer = frame_buffer();
    vdp.render_frame(&mut buffer);
    assert_eq!(
        &buffer[0..3],
        &[255, 0, 0],
        "row 1 of the tilemap appears at screen row 0"
    );
}
