pub mod mock_network;
