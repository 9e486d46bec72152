#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::sync::{Arc, Mutex};

    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use wiicmath_portal::captive_portal::{CaptivePortal, CredentialStore, NvsStore, PortalEvent};
    use wiicmath_portal::config::{PortalConfig, PORTAL_URL, RESTART_DELAY};

    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    let peripherals = esp_idf_svc::hal::prelude::Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;

    let config = PortalConfig::from_build_env();
    log::info!("Portal config: {:?}", config);

    let partition = esp_idf_svc::nvs::EspDefaultNvsPartition::take()?;
    let nvs = esp_idf_svc::nvs::EspDefaultNvs::new(partition, config.nvs_namespace, true)?;
    let store = NvsStore::new(nvs);

    match store.load() {
        Ok(Some(credentials)) => log::info!("Stored credentials: {:?}", credentials),
        Ok(None) => log::info!("No stored credentials"),
        Err(e) => log::error!("Failed to load credentials: {:?}", e),
    }

    let mut wifi_ap_mac = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_read_mac(
            wifi_ap_mac.as_mut_ptr(),
            esp_idf_svc::sys::esp_mac_type_t_ESP_MAC_WIFI_SOFTAP,
        );
    }
    let ap_ssid = config.ap_ssid(&wifi_ap_mac);

    let (evt_tx, mut evt_rx) = tokio::sync::mpsc::channel(4);

    let portal = CaptivePortal::start(
        peripherals.modem,
        sysloop,
        &config,
        &ap_ssid,
        Arc::new(Mutex::new(store)),
        evt_tx,
    )?;
    log::info!("Join WiFi {} and open {}", ap_ssid, PORTAL_URL);
    log_heap();

    let b = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    b.block_on(async {
        match evt_rx.recv().await {
            Some(PortalEvent::Configured(credentials)) => {
                log::info!("Configured for SSID {:?}, rebooting...", credentials.ssid);
            }
            None => log::error!("Portal event channel closed"),
        }
        tokio::time::sleep(RESTART_DELAY).await;
    });

    drop(portal);
    unsafe { esp_idf_svc::sys::esp_restart() }
}

#[cfg(target_os = "espidf")]
fn log_heap() {
    unsafe {
        use esp_idf_svc::sys::{heap_caps_get_free_size, MALLOC_CAP_INTERNAL};

        log::info!(
            "Free INTERNAL heap size: {}KB",
            heap_caps_get_free_size(MALLOC_CAP_INTERNAL) / 1024
        );
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("wiicmath-portal only runs on ESP-IDF targets")
}
