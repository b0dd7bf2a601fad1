use once_cell::sync::Lazy;

use super::*;
use crate::cartridge::{CartridgeType, RomBank};
use crate::config::{BootState, CoreConfig};
use crate::cpu::Bus;
use crate::diagnostics::RecordingSink;
use crate::error::MemoryError;
use crate::ppu::NullRenderer;

static ZEROED: Lazy<CoreConfig> = Lazy::new(|| CoreConfig::builder().boot_state(BootState::Zeroed).build());

fn rom_only() -> Cartridge {
    let mut bank0 = RomBank::filled(0x00);
    bank0.write(0x0100, 0x3C);
    Cartridge::rom_only(bank0, RomBank::filled(0x11))
}

fn bus_with(config: &CoreConfig) -> (MemoryBus, RecordingSink) {
    let sink = RecordingSink::new();
    let bus = MemoryBus::with_sink(rom_only(), config, Box::new(sink.clone()));
    (bus, sink)
}

#[test]
fn regions_partition_the_address_space() {
    let mut next = 0u32;
    for region in Region::ALL {
        let range = region.range();
        assert_eq!(*range.start() as u32, next, "{region:?} starts where the previous ends");
        next = *range.end() as u32 + 1;
    }
    assert_eq!(next, 0x10000);

    for addr in 0..=0xFFFFu16 {
        let region = Region::of(addr);
        assert!(region.range().contains(&addr), "{addr:04X} -> {region:?}");
    }
}

#[test]
fn rom_reads_go_through_the_cartridge() {
    let (mut bus, _) = bus_with(&ZEROED);
    assert_eq!(bus.read8(0x0100).unwrap(), 0x3C);
    assert_eq!(bus.read8(0x4000).unwrap(), 0x11);
}

#[test]
fn echo_mirrors_work_ram() {
    let (mut bus, _) = bus_with(&ZEROED);
    for addr in 0xE000..=0xFDFFu16 {
        let value = (addr ^ (addr >> 8)) as u8;
        bus.write8(addr, value).unwrap();
        assert_eq!(bus.read8(addr - 0x2000).unwrap(), value);
    }
    for addr in 0xC000..=0xDDFFu16 {
        bus.write8(addr, !(addr as u8)).unwrap();
        assert_eq!(bus.read8(addr + 0x2000).unwrap(), !(addr as u8));
    }
}

#[test]
fn unusable_region() {
    let (mut bus, sink) = bus_with(&ZEROED);
    assert_eq!(bus.read8(0xFEA0).unwrap(), 0xFF);
    let err = bus.write8(0xFEFF, 0x42).unwrap_err();
    assert_eq!(err, MemoryError::Unusable { addr: 0xFEFF, value: 0x42 });
    assert!(sink.events().contains(&Event::MemoryFault(err)));
}

#[test]
fn vram_dma_window() {
    let (mut bus, _) = bus_with(&ZEROED);
    for addr in 0xFF51..=0xFF55 {
        assert_eq!(bus.read8(addr).unwrap_err(), MemoryError::VramDmaRead { addr });
        bus.write8(addr, 0x12).unwrap();
    }
}

#[test]
fn oam_dma_copies_and_stalls() {
    let (mut bus, sink) = bus_with(&ZEROED);
    for i in 0..0xA0u16 {
        bus.write8(0xC100 + i, i as u8 ^ 0x5A).unwrap();
    }
    assert_eq!(bus.take_stall_cycles(), 0);

    bus.write8(0xFF46, 0xC1).unwrap();

    for i in 0..0xA0u16 {
        assert_eq!(bus.read8(0xFE00 + i).unwrap(), i as u8 ^ 0x5A);
    }
    assert_eq!(bus.read8(0xFF46).unwrap(), 0xC1);
    assert_eq!(bus.take_stall_cycles(), 640);
    assert_eq!(bus.take_stall_cycles(), 0);
    assert!(sink.events().contains(&Event::OamDma { source: 0xC100 }));
}

#[test]
fn oam_dma_from_high_page_reads_work_ram() {
    let (mut bus, sink) = bus_with(&ZEROED);
    bus.write8(0xDF00, 0xAB).unwrap();
    bus.write8(0xDF9F, 0xCD).unwrap();

    bus.write8(0xFF46, 0xFF).unwrap();

    assert_eq!(bus.read8(0xFE00).unwrap(), 0xAB);
    assert_eq!(bus.read8(0xFE9F).unwrap(), 0xCD);
    assert_eq!(bus.take_stall_cycles(), 640);
    let transfers = sink
        .events()
        .iter()
        .filter(|e| matches!(e, Event::OamDma { .. }))
        .count();
    assert_eq!(transfers, 1);
}

#[test]
fn rom_writes_without_controller() {
    let (mut bus, sink) = bus_with(&ZEROED);
    bus.write8(0x2000, 0x05).unwrap();
    assert_eq!(bus.read8(0x4000).unwrap(), 0x11);
    assert!(sink.events().contains(&Event::RomWriteIgnored { addr: 0x2000, value: 0x05 }));

    let strict = CoreConfig::builder()
        .boot_state(BootState::Zeroed)
        .strict_rom_writes(true)
        .build();
    let (mut bus, _) = bus_with(&strict);
    assert_eq!(
        bus.write8(0x2000, 0x05).unwrap_err(),
        MemoryError::ReadOnly { addr: 0x2000, value: 0x05 }
    );
}

#[test]
fn rom_bank_select_through_controller() {
    let rom = (0..8).map(|n| RomBank::filled(n as u8)).collect();
    let cart = Cartridge::new(rom, 0, CartridgeType::from_code(0x01).unwrap()).unwrap();
    let sink = RecordingSink::new();
    let mut bus = MemoryBus::with_sink(cart, &ZEROED, Box::new(sink.clone()));

    bus.write8(0x2000, 0x03).unwrap();
    assert_eq!(bus.read8(0x4000).unwrap(), 3);
    assert!(sink.events().contains(&Event::RomBankSelected { bank: 3 }));
}

#[test]
fn interrupt_registers() {
    let (mut bus, _) = bus_with(&ZEROED);
    assert_eq!(bus.read8(0xFF0F).unwrap(), 0xE0);
    bus.write8(0xFF0F, 0xFF).unwrap();
    assert_eq!(bus.read8(0xFF0F).unwrap(), 0xFF);
    bus.write8(0xFF0F, 0x04).unwrap();
    assert_eq!(bus.read8(0xFF0F).unwrap(), 0xE4);

    bus.write8(0xFFFF, 0xA5).unwrap();
    assert_eq!(bus.read8(0xFFFF).unwrap(), 0xA5);
}

#[test]
fn unmapped_io_reads_open_bus() {
    let (mut bus, _) = bus_with(&ZEROED);
    for addr in [0xFF03, 0xFF08, 0xFF4C, 0xFF56, 0xFF7F] {
        bus.write8(addr, 0x00).unwrap();
        assert_eq!(bus.read8(addr).unwrap(), 0xFF, "{addr:04X}");
    }
    bus.write8(0xFF50, 0x01).unwrap();
    assert_eq!(bus.read8(0xFF50).unwrap(), 0x01);
    assert!(bus.boot_rom_disabled());
}

#[test]
fn high_ram_and_vram() {
    let (mut bus, _) = bus_with(&ZEROED);
    bus.write8(0xFF80, 0x01).unwrap();
    bus.write8(0xFFFE, 0x02).unwrap();
    bus.write8(0x8000, 0x03).unwrap();
    bus.write8(0x9FFF, 0x04).unwrap();
    assert_eq!(bus.read8(0xFF80).unwrap(), 0x01);
    assert_eq!(bus.read8(0xFFFE).unwrap(), 0x02);
    assert_eq!(bus.ppu().vram()[0], 0x03);
    assert_eq!(bus.ppu().vram()[0x1FFF], 0x04);
}

#[test]
fn serial_transfer_raises_interrupt() {
    let (mut bus, sink) = bus_with(&ZEROED);
    bus.write8(0xFF01, b'P').unwrap();
    bus.write8(0xFF02, 0x81).unwrap();
    assert_eq!(bus.serial().output(), b"P");
    assert_eq!(bus.read8(0xFF01).unwrap(), 0xFF);
    assert_eq!(bus.read8(0xFF0F).unwrap() & 0x08, 0x08);
    assert!(sink.events().contains(&Event::SerialByte(b'P')));
}

#[test]
fn tick_merges_timer_and_ppu_interrupts() {
    let (mut bus, _) = bus_with(&ZEROED);
    // Timer at 262144 Hz, one increment away from overflow.
    bus.write8(0xFF06, 0x00).unwrap();
    bus.write8(0xFF05, 0xFF).unwrap();
    bus.write8(0xFF07, 0x05).unwrap();
    bus.write8(0xFF40, 0x80).unwrap();

    bus.tick(16, &mut NullRenderer);
    bus.tick(4, &mut NullRenderer);
    assert_eq!(bus.read8(0xFF0F).unwrap() & 0x04, 0x04);

    bus.tick(144 * 456, &mut NullRenderer);
    assert_eq!(bus.read8(0xFF0F).unwrap() & 0x01, 0x01);
}

#[test]
fn lcd_power_is_reported() {
    let (mut bus, sink) = bus_with(&ZEROED);
    bus.write8(0xFF40, 0x91).unwrap();
    bus.write8(0xFF40, 0x91).unwrap();
    bus.write8(0xFF40, 0x11).unwrap();
    let power: Vec<_> = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::LcdPower { .. }))
        .collect();
    assert_eq!(
        power,
        vec![Event::LcdPower { enabled: true }, Event::LcdPower { enabled: false }]
    );
}

#[test]
fn post_boot_io_state() {
    let (mut bus, _) = bus_with(&CoreConfig::default());
    assert_eq!(bus.read8(0xFF0F).unwrap(), 0xE1);
    assert_eq!(bus.read8(0xFF02).unwrap(), 0x7E);
    assert_eq!(bus.read8(0xFF04).unwrap(), 0xAB);
    assert_eq!(bus.read8(0xFF07).unwrap(), 0xF8);
    assert_eq!(bus.read8(0xFF40).unwrap(), 0x91);
    assert_eq!(bus.read8(0xFF47).unwrap(), 0xFC);
    assert_eq!(bus.read8(0xFF26).unwrap(), 0xF1);
    assert_eq!(bus.read8(0xFF00).unwrap() & 0xC0, 0xC0);
}

#[test]
fn joypad_press_requests_interrupt() {
    let (mut bus, _) = bus_with(&ZEROED);
    bus.write8(0xFF00, 0x10).unwrap();
    bus.set_button(Button::A, true);
    assert_eq!(bus.read8(0xFF0F).unwrap() & 0x10, 0x10);
    assert_eq!(bus.read8(0xFF00).unwrap() & 0x01, 0x00);
}
