#![no_std]
#![no_main]

use defmt::{info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::{
    analog::adc::{Adc, AdcConfig, Attenuation},
    gpio::{Input, InputConfig, Pull},
    timer::{timg::TimerGroup, AnyTimer},
};

use webspector::adc::oneshot_source;
use webspector::config::{BUTTON_DEBOUNCE_MS, MODE_COUNT, REPORT_EVERY_FRAMES};
use webspector_dsp::{AcquisitionConfig, SampleAcquirer, SAMPLEBLOCK, SAMPLING_FREQUENCY};
use webspector_viz::{BandExchange, Controls, PipelineConfig, SpectrumPipeline, NOISE_THRESHOLD};

static CONTROLS: Controls = Controls::new(NOISE_THRESHOLD);
static BANDS: BandExchange<CriticalSectionRawMutex> = BandExchange::new();

macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

#[embassy_executor::task]
async fn mode_button(mut button: Input<'static>, controls: &'static Controls) {
    info!("Starting mode_button task");
    loop {
        button.wait_for_falling_edge().await;
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        if button.is_low() {
            let mode = controls.cycle_mode(MODE_COUNT);
            info!("Display mode {}", mode);
        }
    }
}

/// Logs published frames until a display or network consumer takes over.
#[embassy_executor::task]
async fn reporter(bands: &'static BandExchange<CriticalSectionRawMutex>) {
    info!("Starting reporter task");
    loop {
        let frame = bands.wait_frame().await;
        if frame.sequence % REPORT_EVERY_FRAMES == 0 {
            info!(
                "frame {} mode {} gain {}: {:?}",
                frame.sequence, frame.mode, frame.gain_level, frame.bar_heights
            );
        }
    }
}

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    info!("Init!");

    let peripherals = esp_hal::init(esp_hal::Config::default());

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let timer0: AnyTimer = timg0.timer0.into();

    let timg1 = TimerGroup::new(peripherals.TIMG1);
    let timer1: AnyTimer = timg1.timer0.into();

    esp_hal_embassy::init([timer0, timer1]);

    // ADC1 channel 0 sits on GPIO1
    let mut adc_config = AdcConfig::new();
    let mut adc_pin = adc_config.enable_pin(peripherals.GPIO1, Attenuation::_11dB);
    let mut adc = Adc::new(peripherals.ADC1, adc_config);
    let source = oneshot_source(move || adc.read_oneshot(&mut adc_pin), SAMPLING_FREQUENCY);

    let mut acquirer =
        SampleAcquirer::<_, SAMPLEBLOCK>::new(source, &AcquisitionConfig::default()).unwrap();
    let pipeline = mk_static!(
        SpectrumPipeline<SAMPLEBLOCK>,
        SpectrumPipeline::new(&PipelineConfig::default()).unwrap()
    );

    let button = Input::new(
        peripherals.GPIO15,
        InputConfig::default().with_pull(Pull::Up),
    );
    spawner.must_spawn(mode_button(button, &CONTROLS));
    spawner.must_spawn(reporter(&BANDS));

    let mut reported_failures = 0;
    loop {
        let snapshot = pipeline.run_frame(&mut acquirer, &CONTROLS);
        BANDS.publish(snapshot);

        let stats = acquirer.stats();
        if stats.failures() != reported_failures {
            reported_failures = stats.failures();
            warn!(
                "acquisition: {} timeouts, {} faults in {} blocks",
                stats.timeouts, stats.faults, stats.blocks
            );
        }

        // sampling busy-waits, so give the other tasks a turn between frames
        Timer::after(Duration::from_millis(1)).await;
    }
}
